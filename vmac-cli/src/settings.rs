//! Tool settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use vmac_session::SessionTiming;
use vmac_sim::VirtualTrackerConfig;

/// Directory name under the platform config dir
const APP_DIR: &str = "vmac-provision";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed settings in {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Settings read once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Port to use instead of auto-detection; `VSIM:<name>` selects the simulator
    pub port: Option<String>,
    /// Session delays and read windows
    pub timing: SessionTiming,
    /// Behavior of the simulated tracker
    pub simulator: VirtualTrackerConfig,
}

impl Settings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            debug!("No config directory on this host, using default settings");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::read_from(&path) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse a settings file
    pub fn read_from(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("vmac-settings-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file("partial.json", r#"{ "port": "VSIM:bench", "timing": { "command_settle_ms": 10 } }"#);
        let settings = Settings::read_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.port.as_deref(), Some("VSIM:bench"));
        assert_eq!(settings.timing.command_settle_ms, 10);
        assert_eq!(settings.timing.collect_window_ms, 1_000);
        assert!(settings.simulator.start_in_mac_mode);
    }

    #[test]
    fn test_simulator_section() {
        let path = temp_file(
            "sim.json",
            r#"{ "simulator": { "initial_vmac": "AAAAAAAA0001", "chatter": [], "echo_only": true } }"#,
        );
        let settings = Settings::read_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.port, None);
        assert_eq!(
            settings.simulator.initial_vmac.map(String::from).as_deref(),
            Some("AAAAAAAA0001")
        );
        assert!(settings.simulator.echo_only);
        assert!(settings.simulator.chatter.is_empty());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = temp_file("bad.json", "{ port: ");
        let result = Settings::read_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SettingsError::Malformed { .. })));
    }

    #[test]
    fn test_invalid_vmac_rejected() {
        let path = temp_file("vmac.json", r#"{ "simulator": { "initial_vmac": "XYZ" } }"#);
        let result = Settings::read_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let path = std::env::temp_dir().join("vmac-settings-does-not-exist.json");
        assert!(matches!(
            Settings::read_from(&path),
            Err(SettingsError::Read { .. })
        ));
    }

    #[test]
    fn test_round_trip_defaults() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), Settings::default());
    }
}

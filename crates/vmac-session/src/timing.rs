//! Session timing
//!
//! The tracker signals neither readiness nor the end of a response, so
//! every exchange is paced by fixed delays and bounded read windows.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vmac_protocol::AtCommand;

/// Delays and windows used by a session, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTiming {
    /// Gap between the bare CRLF probes sent during diagnosis
    pub probe_interval_ms: u64,
    /// How long to watch for log output during diagnosis
    pub diagnose_window_ms: u64,
    /// Read window after a command's settle delay
    pub collect_window_ms: u64,
    /// Sleep between polls of the link
    pub poll_interval_ms: u64,
    /// Settle delay for VMAC and configuration commands
    pub command_settle_ms: u64,
    /// Settle delay for the reboot command
    pub reboot_settle_ms: u64,
    /// Pause after the operator confirms MAC configuration mode
    pub mode_entry_settle_ms: u64,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            probe_interval_ms: 500,
            diagnose_window_ms: 5_000,
            collect_window_ms: 1_000,
            poll_interval_ms: 100,
            command_settle_ms: 3_000,
            reboot_settle_ms: 2_000,
            mode_entry_settle_ms: 2_000,
        }
    }
}

impl SessionTiming {
    /// No waiting at all; each read window still polls once
    pub fn immediate() -> Self {
        Self {
            probe_interval_ms: 0,
            diagnose_window_ms: 0,
            collect_window_ms: 0,
            poll_interval_ms: 0,
            command_settle_ms: 0,
            reboot_settle_ms: 0,
            mode_entry_settle_ms: 0,
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn diagnose_window(&self) -> Duration {
        Duration::from_millis(self.diagnose_window_ms)
    }

    pub fn collect_window(&self) -> Duration {
        Duration::from_millis(self.collect_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn command_settle(&self) -> Duration {
        Duration::from_millis(self.command_settle_ms)
    }

    pub fn reboot_settle(&self) -> Duration {
        Duration::from_millis(self.reboot_settle_ms)
    }

    pub fn mode_entry_settle(&self) -> Duration {
        Duration::from_millis(self.mode_entry_settle_ms)
    }

    /// Settle delay after sending `command`
    pub fn settle_for(&self, command: &AtCommand) -> Duration {
        if command.is_configuration() {
            self.command_settle()
        } else {
            self.reboot_settle()
        }
    }
}

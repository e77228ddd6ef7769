//! Tracker port selection
//!
//! Tracker boards sit behind a generic USB-serial bridge, so there is no
//! vendor ID to key on. Instead the port name and description are matched
//! against substrings typical of such adapters on each host family. The
//! match is a heuristic: an unrelated adapter can be picked, and a tracker
//! behind an unusual driver can be missed. Callers show the unfiltered list
//! when nothing matches.

use tracing::{debug, info};

use crate::error::DetectError;
use crate::scanner::{DiscoveredPort, PortScanner};

/// Marker in Windows device names ("COM3")
const COM_MARKER: &str = "COM";

/// Description tokens for USB-serial bridges on Windows (matched uppercase)
const WINDOWS_DESCRIPTION_TOKENS: [&str; 5] = ["USB", "SERIAL", "FTDI", "CH340", "PROLIFIC"];

/// Host family, which decides the filtering heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostClass {
    /// COM-port naming with driver-supplied descriptions
    WindowsLike,
    /// /dev paths (macOS `cu.usbserial-*`, Linux `ttyUSB*`)
    UnixLike,
}

impl HostClass {
    /// Host class of the platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            HostClass::WindowsLike
        } else {
            HostClass::UnixLike
        }
    }

    /// Whether `port` looks like a tracker adapter on this host class
    pub fn matches(&self, port: &DiscoveredPort) -> bool {
        match self {
            HostClass::WindowsLike => {
                let description = port.description.to_uppercase();
                port.device.contains(COM_MARKER)
                    && WINDOWS_DESCRIPTION_TOKENS
                        .iter()
                        .any(|token| description.contains(token))
            }
            HostClass::UnixLike => {
                port.device.to_lowercase().contains("usbserial") || port.device.contains("ttyUSB")
            }
        }
    }
}

/// Pick the first port in enumeration order that matches `host`
pub fn select_tracker_port(ports: &[DiscoveredPort], host: HostClass) -> Option<&DiscoveredPort> {
    ports.iter().find(|p| host.matches(p))
}

/// Finds the tracker's serial port
#[derive(Debug)]
pub struct PortLocator {
    host: HostClass,
    scanner: PortScanner,
}

impl PortLocator {
    /// Create a locator for the current host
    pub fn new() -> Self {
        Self::for_host(HostClass::current())
    }

    /// Create a locator using a specific host class heuristic
    pub fn for_host(host: HostClass) -> Self {
        Self {
            host,
            scanner: PortScanner::new(),
        }
    }

    /// The heuristic in use
    pub fn host(&self) -> HostClass {
        self.host
    }

    /// Enumerate ports and return the first tracker candidate
    ///
    /// When nothing matches, the error carries the full port list.
    pub fn locate(&self) -> Result<DiscoveredPort, DetectError> {
        let ports = self.scanner.enumerate_ports()?;
        match select_tracker_port(&ports, self.host) {
            Some(port) => {
                info!("Tracker port candidate: {} ({})", port.device, port.description);
                Ok(port.clone())
            }
            None => {
                debug!("No port matched the {:?} heuristic", self.host);
                Err(DetectError::NoTrackerPort { available: ports })
            }
        }
    }
}

impl Default for PortLocator {
    fn default() -> Self {
        Self::new()
    }
}

//! Error types for tracker port detection

use thiserror::Error;

use crate::scanner::DiscoveredPort;

/// Errors that can occur during detection
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Enumeration worked but nothing looked like a tracker adapter
    #[error("no tracker port found among {} serial port(s)", available.len())]
    NoTrackerPort {
        /// Every port the host reported, unfiltered
        available: Vec<DiscoveredPort>,
    },
}

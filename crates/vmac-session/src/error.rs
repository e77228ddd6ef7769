//! Error types for a provisioning session

use thiserror::Error;
use vmac_detect::{DetectError, DiscoveredPort};

/// Ways a provisioning run can end in failure
///
/// An empty device response is not represented here: it is a valid,
/// reportable outcome of a command exchange.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Serial port support is unusable on this host
    #[error("serial port support unavailable: {0}")]
    DependencyMissing(String),

    /// No port matched the tracker heuristic
    #[error("tracker port not found ({} port(s) present)", available.len())]
    PortNotFound {
        /// Every port the host reported, for manual diagnosis
        available: Vec<DiscoveredPort>,
    },

    /// The port could not be opened or configured
    #[error("failed to open {port}: {reason}")]
    Connect { port: String, reason: String },

    /// Operator declined to continue after diagnosis
    #[error("cancelled by operator")]
    UserCancelled,

    /// External interrupt (Ctrl-C) during the run
    #[error("interrupted by operator")]
    UserInterrupted,

    /// Anything else: I/O failure on the open link, closed input stream
    #[error("unexpected fault: {0}")]
    Unexpected(String),
}

impl SessionError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<DetectError> for SessionError {
    fn from(e: DetectError) -> Self {
        match e {
            DetectError::NoTrackerPort { available } => SessionError::PortNotFound { available },
            DetectError::EnumerationFailed(reason) => SessionError::DependencyMissing(reason),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Unexpected(format!("I/O error: {e}"))
    }
}

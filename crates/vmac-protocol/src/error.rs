//! Error types for VMAC protocol parsing and validation

use thiserror::Error;

/// Reasons an operator-supplied MAC suffix is rejected
///
/// The two variants correspond to the two validation stages, checked in
/// order: the alphanumeric filter first, then the strict hex format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SuffixError {
    /// Input contains something other than ASCII letters and digits
    #[error("only letters and digits are allowed (got {input:?})")]
    NotAlphanumeric { input: String },

    /// Input is alphanumeric but not exactly four hex digits
    #[error("expected exactly 4 hex digits 0-9/A-F (got {input:?}, length {len})")]
    NotFourHexDigits { input: String, len: usize },
}

/// Errors that can occur while parsing protocol data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// VMAC value is not 12 hex characters
    #[error("invalid VMAC value: {0}")]
    InvalidVmac(String),

    /// Unknown or unsupported command
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

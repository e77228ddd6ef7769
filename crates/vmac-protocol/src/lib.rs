//! Tracker AT Protocol Library
//!
//! This crate provides the wire vocabulary for provisioning a tracker's
//! virtual MAC address over a serial link:
//!
//! - **Commands**: `AT+VMAC`, `AT+VMAC=<value>`, `AT+SCFG`, `AT+RBOT`, each
//!   terminated by CRLF
//! - **VMAC values**: a fixed `AAAAAAAA` prefix plus a 4-hex-digit suffix
//! - **Responses**: line classification into AT replies and device log output
//!
//! No I/O happens here; see `vmac-session` for the transport side.
//!
//! # Example
//!
//! ```rust
//! use vmac_protocol::{AtCommand, ClassifiedResponse, EncodeCommand, VmacAddress};
//!
//! let vmac = VmacAddress::from_suffix("b2c3").unwrap();
//! assert_eq!(AtCommand::SetVmac(vmac).encode(), b"AT+VMAC=AAAAAAAAB2C3\r\n");
//!
//! let resp = ClassifiedResponse::from_text("OK\r\nheartbeat\r\n");
//! assert_eq!(resp.at_lines, vec!["OK"]);
//! assert_eq!(resp.log_lines, vec!["heartbeat"]);
//! ```

pub mod command;
pub mod error;
pub mod response;
pub mod vmac;

pub use command::{AtCommand, LINE_TERMINATOR};
pub use error::{ParseError, SuffixError};
pub use response::{
    classify_line, decode, parse_vmac_report, ClassifiedResponse, LineClass, AT_MARKERS,
    MAX_DISPLAY_LINES,
};
pub use vmac::{normalize_suffix, VmacAddress, SUFFIX_LEN, VMAC_LEN, VMAC_PREFIX};

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}

//! Tracker AT command set
//!
//! The tracker accepts a handful of Hayes-style commands, each sent as an
//! ASCII line terminated by CRLF.
//!
//! # Commands
//! - `AT+VMAC` - query the configured VMAC
//! - `AT+VMAC=<12 hex>` - set the VMAC (only accepted in MAC configuration mode)
//! - `AT+SCFG` - dump the full device configuration
//! - `AT+RBOT` - reboot the device

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::vmac::VmacAddress;
use crate::EncodeCommand;

/// Line terminator appended to every command
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

const VMAC: &str = "AT+VMAC";
const SCFG: &str = "AT+SCFG";
const RBOT: &str = "AT+RBOT";

/// A command understood by the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtCommand {
    /// Query the current VMAC: AT+VMAC
    QueryVmac,
    /// Set the VMAC: AT+VMAC=AAAAAAAAB2C3
    SetVmac(VmacAddress),
    /// Dump full configuration: AT+SCFG
    DumpConfig,
    /// Reboot: AT+RBOT
    Reboot,
}

impl AtCommand {
    /// Short description used when reporting the exchange
    pub fn description(&self) -> &'static str {
        match self {
            AtCommand::QueryVmac => "Query VMAC",
            AtCommand::SetVmac(_) => "Set VMAC",
            AtCommand::DumpConfig => "Dump configuration",
            AtCommand::Reboot => "Reboot",
        }
    }

    /// Whether this command belongs to the VMAC/SCFG configuration family
    pub fn is_configuration(&self) -> bool {
        !matches!(self, AtCommand::Reboot)
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtCommand::QueryVmac => f.write_str(VMAC),
            AtCommand::SetVmac(vmac) => write!(f, "{VMAC}={vmac}"),
            AtCommand::DumpConfig => f.write_str(SCFG),
            AtCommand::Reboot => f.write_str(RBOT),
        }
    }
}

impl EncodeCommand for AtCommand {
    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.to_string().into_bytes();
        bytes.extend_from_slice(LINE_TERMINATOR);
        bytes
    }
}

impl FromStr for AtCommand {
    type Err = ParseError;

    /// Parse a command line as the device would see it (terminator optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        match line {
            VMAC => Ok(AtCommand::QueryVmac),
            SCFG => Ok(AtCommand::DumpConfig),
            RBOT => Ok(AtCommand::Reboot),
            _ => match line.strip_prefix("AT+VMAC=") {
                Some(value) => Ok(AtCommand::SetVmac(value.parse()?)),
                None => Err(ParseError::UnknownCommand(line.to_string())),
            },
        }
    }
}

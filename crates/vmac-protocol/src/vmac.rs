//! Virtual MAC address values
//!
//! A tracker VMAC is 12 uppercase hex characters. Provisioning only ever
//! varies the last four: the first eight are the fixed [`VMAC_PREFIX`].

use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, SuffixError};

/// Fixed leading part of every provisioned VMAC
pub const VMAC_PREFIX: &str = "AAAAAAAA";

/// Number of hex characters the operator supplies
pub const SUFFIX_LEN: usize = 4;

/// Total length of a VMAC value in hex characters
pub const VMAC_LEN: usize = 12;

/// A validated, uppercase 12-hex-character VMAC
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct VmacAddress(String);

impl VmacAddress {
    /// Compose a VMAC from an operator-supplied suffix
    ///
    /// All whitespace is removed first. The remainder must be ASCII
    /// alphanumeric, and then exactly four hex digits.
    pub fn from_suffix(input: &str) -> Result<Self, SuffixError> {
        let suffix = normalize_suffix(input)?;
        Ok(Self(format!("{VMAC_PREFIX}{suffix}")))
    }

    /// The full 12-character value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last four characters (the operator-chosen part)
    pub fn suffix(&self) -> &str {
        &self.0[VMAC_LEN - SUFFIX_LEN..]
    }
}

/// Strip whitespace and validate a suffix, returning it uppercased
pub fn normalize_suffix(input: &str) -> Result<String, SuffixError> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SuffixError::NotAlphanumeric { input: stripped });
    }

    if stripped.len() != SUFFIX_LEN || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        let len = stripped.chars().count();
        return Err(SuffixError::NotFourHexDigits {
            input: stripped,
            len,
        });
    }

    Ok(stripped.to_ascii_uppercase())
}

impl FromStr for VmacAddress {
    type Err = ParseError;

    /// Parse a complete 12-hex-character value (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == VMAC_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(ParseError::InvalidVmac(s.to_string()))
        }
    }
}

impl TryFrom<String> for VmacAddress {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VmacAddress> for String {
    fn from(value: VmacAddress) -> Self {
        value.0
    }
}

impl fmt::Display for VmacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

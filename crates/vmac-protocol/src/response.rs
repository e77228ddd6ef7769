//! Response decoding and line classification
//!
//! The tracker has no framed response format: AT replies are interleaved
//! with free-form firmware logging on the same line stream. Lines are
//! sorted into two classes by literal marker substrings.
//!
//! The `AT` marker is a plain substring match, so ordinary log lines that
//! happen to contain it (`STATUS`, `AT the moment`) are classified as
//! protocol lines too.

use crate::vmac::{VmacAddress, VMAC_LEN};

/// Substrings that mark a line as part of an AT exchange (case-sensitive)
pub const AT_MARKERS: [&str; 4] = ["VMAC", "OK", "ERROR", "AT"];

/// Maximum lines retained per class for display
pub const MAX_DISPLAY_LINES: usize = 10;

/// Class of a single response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Line carries an AT reply or echo
    AtProtocol,
    /// Anything else the firmware printed
    DeviceLog,
}

/// Classify a single line by marker substring
pub fn classify_line(line: &str) -> LineClass {
    if AT_MARKERS.iter().any(|marker| line.contains(marker)) {
        LineClass::AtProtocol
    } else {
        LineClass::DeviceLog
    }
}

/// Decode raw bytes, replacing invalid UTF-8 sequences with U+FFFD
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// A decoded block split into protocol and log lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifiedResponse {
    /// Most recent AT-protocol lines, oldest first
    pub at_lines: Vec<String>,
    /// Most recent device log lines, oldest first
    pub log_lines: Vec<String>,
}

impl ClassifiedResponse {
    /// Split `text` into trimmed, non-empty lines and classify each
    ///
    /// Only the last [`MAX_DISPLAY_LINES`] of each class are kept.
    pub fn from_text(text: &str) -> Self {
        let mut at_lines = Vec::new();
        let mut log_lines = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match classify_line(line) {
                LineClass::AtProtocol => at_lines.push(line.to_string()),
                LineClass::DeviceLog => log_lines.push(line.to_string()),
            }
        }

        Self {
            at_lines: keep_last(at_lines, MAX_DISPLAY_LINES),
            log_lines: keep_last(log_lines, MAX_DISPLAY_LINES),
        }
    }

    /// True when neither class produced a line
    pub fn is_empty(&self) -> bool {
        self.at_lines.is_empty() && self.log_lines.is_empty()
    }

    /// The last VMAC value echoed in an AT line, if any
    pub fn reported_vmac(&self) -> Option<VmacAddress> {
        self.at_lines.iter().rev().find_map(|l| parse_vmac_report(l))
    }
}

fn keep_last(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if lines.len() > max {
        lines.drain(..lines.len() - max);
    }
    lines
}

/// Extract a VMAC value from a report line such as `AT+VMAC:AAAAAAAAB2C3`
/// or `+VMAC=AAAAAAAAB2C3`
pub fn parse_vmac_report(line: &str) -> Option<VmacAddress> {
    let (_, rest) = line.split_once("VMAC")?;
    let value: String = rest
        .trim_start_matches(|c: char| c == ':' || c == '=' || c.is_whitespace())
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();

    if value.len() == VMAC_LEN {
        value.parse().ok()
    } else {
        None
    }
}

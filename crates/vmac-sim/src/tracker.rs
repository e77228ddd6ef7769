//! Virtual tracker simulation
//!
//! Provides a simulated tracker that answers the AT command set and
//! produces firmware-style log chatter, queued as raw output bytes.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use vmac_protocol::{AtCommand, VmacAddress, LINE_TERMINATOR};

/// Longest line buffered before the input is discarded as noise
const MAX_LINE_LEN: usize = 128;

/// Configuration for creating a virtual tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualTrackerConfig {
    /// Display name/identifier
    pub id: String,
    /// VMAC reported before anything is written
    pub initial_vmac: Option<VmacAddress>,
    /// Answer every AT command with a bare `OK` and keep no state
    pub echo_only: bool,
    /// Start with MAC configuration mode already entered
    pub start_in_mac_mode: bool,
    /// Log lines printed whenever a bare line ending is received
    pub chatter: Vec<String>,
}

impl Default for VirtualTrackerConfig {
    fn default() -> Self {
        Self {
            id: "Virtual Tracker".to_string(),
            initial_vmac: None,
            echo_only: false,
            start_in_mac_mode: true,
            chatter: vec![
                "[LED] pattern=idle".to_string(),
                "[Button] released".to_string(),
            ],
        }
    }
}

/// A simulated tracker on the other end of the serial link
#[derive(Debug)]
pub struct VirtualTracker {
    config: VirtualTrackerConfig,
    vmac: Option<VmacAddress>,
    mac_mode: bool,
    reboots: usize,
    /// Partial input line
    line_buffer: Vec<u8>,
    /// Dropping input until the end of an overlong line
    discarding: bool,
    /// Pending output bytes
    pending_output: VecDeque<Vec<u8>>,
    /// Command lines received (for test verification)
    received_commands: Vec<String>,
    /// Times the host closed its end of the link
    link_closes: usize,
}

impl VirtualTracker {
    /// Create a virtual tracker with default settings
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(VirtualTrackerConfig {
            id: id.into(),
            ..Default::default()
        })
    }

    /// Create a tracker that answers `OK` to every AT command
    pub fn echo_ok(id: impl Into<String>) -> Self {
        Self::from_config(VirtualTrackerConfig {
            id: id.into(),
            echo_only: true,
            chatter: Vec::new(),
            ..Default::default()
        })
    }

    /// Create a virtual tracker from configuration
    pub fn from_config(config: VirtualTrackerConfig) -> Self {
        Self {
            vmac: config.initial_vmac.clone(),
            mac_mode: config.start_in_mac_mode,
            config,
            reboots: 0,
            line_buffer: Vec::new(),
            discarding: false,
            pending_output: VecDeque::new(),
            received_commands: Vec::new(),
            link_closes: 0,
        }
    }

    /// Get the tracker's identifier
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Currently stored VMAC
    pub fn vmac(&self) -> Option<&VmacAddress> {
        self.vmac.as_ref()
    }

    /// Whether MAC configuration mode is active
    pub fn in_mac_mode(&self) -> bool {
        self.mac_mode
    }

    /// Number of reboots performed
    pub fn reboots(&self) -> usize {
        self.reboots
    }

    /// Feed bytes written by the host
    pub fn process_input(&mut self, data: &[u8]) {
        for &byte in data {
            match byte {
                b'\n' if self.discarding => self.discarding = false,
                b'\n' => {
                    let line = String::from_utf8_lossy(&self.line_buffer).into_owned();
                    self.line_buffer.clear();
                    self.handle_line(line.trim_end_matches('\r'));
                }
                _ if self.discarding => {}
                _ if self.line_buffer.len() >= MAX_LINE_LEN => {
                    trace!("Discarding overlong input line");
                    self.line_buffer.clear();
                    self.discarding = true;
                }
                _ => self.line_buffer.push(byte),
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        if line.is_empty() {
            let chatter = self.config.chatter.clone();
            for entry in &chatter {
                self.queue_line(entry);
            }
            return;
        }

        self.received_commands.push(line.to_string());
        debug!("{} received {:?}", self.config.id, line);

        if self.config.echo_only {
            self.queue_line("OK");
            return;
        }

        match line.parse::<AtCommand>() {
            Ok(AtCommand::QueryVmac) => {
                let report = format!("+VMAC:{}", self.reported_vmac());
                self.queue_line(&report);
                self.queue_line("OK");
            }
            Ok(AtCommand::SetVmac(vmac)) => {
                if self.mac_mode {
                    self.vmac = Some(vmac);
                    self.queue_line("OK");
                } else {
                    self.queue_line("ERROR");
                }
            }
            Ok(AtCommand::DumpConfig) => {
                let vmac_line = format!("+SCFG:VMAC={}", self.reported_vmac());
                self.queue_line(&vmac_line);
                self.queue_line("+SCFG:BAUD=115200");
                self.queue_line(&format!("+SCFG:MACMODE={}", u8::from(self.mac_mode)));
                self.queue_line("OK");
            }
            Ok(AtCommand::Reboot) => {
                self.queue_line("OK");
                self.reboots += 1;
                self.mac_mode = false;
                self.queue_line("[Boot] restarting");
            }
            Err(e) => {
                debug!("Unrecognized command: {}", e);
                self.queue_line("ERROR");
            }
        }
    }

    fn reported_vmac(&self) -> String {
        self.vmac
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "000000000000".to_string())
    }

    /// Queue one line of output with CRLF
    pub fn queue_line(&mut self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.extend_from_slice(LINE_TERMINATOR);
        self.pending_output.push_back(bytes);
    }

    /// Queue raw output bytes as-is (no terminator added)
    pub fn queue_bytes(&mut self, bytes: &[u8]) {
        self.pending_output.push_back(bytes.to_vec());
    }

    /// Take the next pending output bytes
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.pending_output.pop_front()
    }

    /// Get all received command lines (for test verification)
    pub fn received_commands(&self) -> &[String] {
        &self.received_commands
    }

    /// Record that the host closed the link
    pub fn note_link_closed(&mut self) {
        self.link_closes += 1;
    }

    /// How many times the host closed the link
    pub fn link_closes(&self) -> usize {
        self.link_closes
    }
}

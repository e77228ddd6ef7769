//! AT command dispatch
//!
//! One exchange is: clear stale input, write the command, wait a fixed
//! settle delay, then collect for a short window. An empty reply is a
//! normal result, never an error, and is never retried.

use std::time::Duration;

use tracing::{debug, info};
use vmac_protocol::{decode, AtCommand, ClassifiedResponse, EncodeCommand, VmacAddress};

use crate::collector::ResponseCollector;
use crate::error::SessionError;
use crate::interrupt::InterruptFlag;
use crate::link::DeviceLink;

/// Outcome of one command exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Command text as sent, without the terminator
    pub command: String,
    /// Everything received in the collection window, decoded
    pub raw: String,
    /// Received lines split into AT replies and device log
    pub response: ClassifiedResponse,
}

impl CommandResult {
    fn new(command: &AtCommand, raw: String) -> Self {
        let response = ClassifiedResponse::from_text(&raw);
        Self {
            command: command.to_string(),
            raw,
            response,
        }
    }

    /// True when nothing classifiable came back
    pub fn is_no_response(&self) -> bool {
        self.response.is_empty()
    }

    /// AT-protocol lines, oldest first
    pub fn at_lines(&self) -> &[String] {
        &self.response.at_lines
    }

    /// Device log lines, oldest first
    pub fn log_lines(&self) -> &[String] {
        &self.response.log_lines
    }

    /// VMAC echoed by the device, if any
    pub fn reported_vmac(&self) -> Option<VmacAddress> {
        self.response.reported_vmac()
    }
}

/// Sends AT commands and gathers the reply
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    collector: ResponseCollector,
    interrupt: InterruptFlag,
    collect_window: Duration,
}

impl CommandDispatcher {
    pub fn new(collector: ResponseCollector, interrupt: InterruptFlag, collect_window: Duration) -> Self {
        Self {
            collector,
            interrupt,
            collect_window,
        }
    }

    /// Run one exchange of `command` with the given settle delay
    pub fn send(
        &self,
        link: &mut dyn DeviceLink,
        command: &AtCommand,
        settle: Duration,
    ) -> Result<CommandResult, SessionError> {
        self.interrupt.check()?;

        link.clear_input()?;
        link.write_all(&command.encode())?;
        link.flush()?;
        debug!("Sent {} to {}, settling {:?}", command, link.name(), settle);

        self.interrupt.sleep(settle)?;

        let bytes = self.collector.collect(link, self.collect_window)?;
        let result = CommandResult::new(command, decode(&bytes));

        if result.is_no_response() {
            info!("{}: no response", command);
        } else {
            info!(
                "{}: {} AT line(s), {} log line(s)",
                command,
                result.at_lines().len(),
                result.log_lines().len()
            );
        }
        Ok(result)
    }
}

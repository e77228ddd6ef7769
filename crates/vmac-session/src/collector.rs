//! Response collection
//!
//! The tracker gives no end-of-response marker, so output is gathered by
//! polling the link at a fixed interval until a time window runs out.

use std::time::{Duration, Instant};

use tracing::{debug, trace};
use vmac_protocol::decode;

use crate::error::SessionError;
use crate::interrupt::InterruptFlag;
use crate::link::DeviceLink;

/// Polls a link for a bounded window
#[derive(Debug, Clone)]
pub struct ResponseCollector {
    poll_interval: Duration,
    interrupt: InterruptFlag,
}

impl ResponseCollector {
    pub fn new(poll_interval: Duration, interrupt: InterruptFlag) -> Self {
        Self {
            poll_interval,
            interrupt,
        }
    }

    /// Gather every byte that arrives within `window`
    ///
    /// The link is always polled at least once, so a zero window still
    /// drains whatever is already buffered.
    pub fn collect(
        &self,
        link: &mut dyn DeviceLink,
        window: Duration,
    ) -> Result<Vec<u8>, SessionError> {
        let start = Instant::now();
        let mut data = Vec::new();

        loop {
            let chunk = read_available(link)?;
            if !chunk.is_empty() {
                trace!("Collected {} bytes", chunk.len());
                data.extend_from_slice(&chunk);
            }
            self.interrupt.sleep(self.poll_interval)?;
            if start.elapsed() >= window {
                break;
            }
        }

        debug!("Collected {} bytes in {:?}", data.len(), start.elapsed());
        Ok(data)
    }

    /// Gather output line by line for `duration`
    ///
    /// Each trimmed, non-empty line is passed to `on_line` as soon as it is
    /// complete. A trailing partial line is flushed when the window ends.
    pub fn monitor_lines(
        &self,
        link: &mut dyn DeviceLink,
        duration: Duration,
        mut on_line: impl FnMut(&str),
    ) -> Result<Vec<String>, SessionError> {
        let start = Instant::now();
        let mut pending = Vec::new();
        let mut lines = Vec::new();

        let mut emit = |raw: &[u8], lines: &mut Vec<String>| {
            let text = decode(raw);
            let line = text.trim();
            if !line.is_empty() {
                on_line(line);
                lines.push(line.to_string());
            }
        };

        loop {
            pending.extend(read_available(link)?);
            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = pending.drain(..=pos).collect();
                emit(&raw, &mut lines);
            }
            self.interrupt.sleep(self.poll_interval)?;
            if start.elapsed() >= duration {
                break;
            }
        }

        if !pending.is_empty() {
            emit(&pending, &mut lines);
        }

        debug!("Monitored {} line(s) in {:?}", lines.len(), start.elapsed());
        Ok(lines)
    }
}

/// Read whatever the link currently has buffered
fn read_available(link: &mut dyn DeviceLink) -> Result<Vec<u8>, SessionError> {
    let available = link.bytes_to_read()?;
    if available == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; available];
    let n = link.read(&mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

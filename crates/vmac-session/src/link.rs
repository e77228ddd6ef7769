//! Device link abstraction
//!
//! [`DeviceLink`] is the byte-level surface the session needs from an open
//! port. [`OpenLink`] owns one for the length of a run and guarantees the
//! underlying `close()` is called exactly once.

use std::io;

use tracing::{debug, warn};

/// An open, bidirectional byte link to the tracker
pub trait DeviceLink {
    /// Port identifier this link was opened on
    fn name(&self) -> &str;

    /// Whether the link is still open
    fn is_open(&self) -> bool;

    /// Number of bytes that can be read without blocking
    fn bytes_to_read(&mut self) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data`
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush buffered output to the device
    fn flush(&mut self) -> io::Result<()>;

    /// Discard any unread input
    fn clear_input(&mut self) -> io::Result<()>;

    /// Release the port; calling it on a closed link does nothing
    fn close(&mut self);
}

/// Error for operations on a link that was already closed
pub(crate) fn not_connected(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, format!("{name} is closed"))
}

/// Owning guard around the run's single open link
///
/// The sequencer closes it explicitly on every return path; `Drop` covers
/// a panic unwinding through the run.
pub struct OpenLink {
    link: Box<dyn DeviceLink>,
    closed: bool,
}

impl OpenLink {
    pub fn new(link: Box<dyn DeviceLink>) -> Self {
        Self {
            link,
            closed: false,
        }
    }

    /// The wrapped link
    pub fn link_mut(&mut self) -> &mut dyn DeviceLink {
        self.link.as_mut()
    }

    /// Port identifier
    pub fn name(&self) -> &str {
        self.link.name()
    }

    /// Close the link; returns false if it was already closed by this guard
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.link.close();
        debug!("Closed link {}", self.link.name());
        true
    }
}

impl Drop for OpenLink {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Link {} dropped while open, closing", self.link.name());
            self.close();
        }
    }
}

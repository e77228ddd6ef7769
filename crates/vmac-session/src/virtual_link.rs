//! Link to a simulated tracker
//!
//! Bytes written are handed straight to the [`VirtualTracker`], and its
//! queued output becomes readable input. Ports named `VSIM:<name>` open one
//! of these instead of hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use tracing::trace;
use vmac_sim::VirtualTracker;

use crate::link::{not_connected, DeviceLink};

/// Port name prefix selecting the simulated tracker
pub const VIRTUAL_PORT_PREFIX: &str = "VSIM:";

/// Whether a port name refers to the simulated tracker
pub fn is_virtual_port(name: &str) -> bool {
    name.starts_with(VIRTUAL_PORT_PREFIX)
}

/// [`DeviceLink`] backed by an in-process [`VirtualTracker`]
///
/// The tracker is shared so a test can inspect it after the session has
/// consumed the link.
pub struct VirtualLink {
    name: String,
    tracker: Rc<RefCell<VirtualTracker>>,
    inbound: VecDeque<u8>,
    open: bool,
}

impl VirtualLink {
    pub fn new(name: impl Into<String>, tracker: Rc<RefCell<VirtualTracker>>) -> Self {
        Self {
            name: name.into(),
            tracker,
            inbound: VecDeque::new(),
            open: true,
        }
    }

    /// Shared handle to the simulated device
    pub fn tracker(&self) -> Rc<RefCell<VirtualTracker>> {
        Rc::clone(&self.tracker)
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(not_connected(&self.name))
        }
    }

    /// Move everything the tracker has queued into the inbound buffer
    fn pull(&mut self) {
        let mut tracker = self.tracker.borrow_mut();
        while let Some(bytes) = tracker.take_output() {
            self.inbound.extend(bytes);
        }
    }
}

impl DeviceLink for VirtualLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        self.ensure_open()?;
        self.pull();
        Ok(self.inbound.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        self.pull();
        let n = buf.len().min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.ensure_open()?;
        trace!("{} <- {:?}", self.name, String::from_utf8_lossy(data));
        self.tracker.borrow_mut().process_input(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.pull();
        self.inbound.clear();
        Ok(())
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.tracker.borrow_mut().note_link_closed();
    }
}

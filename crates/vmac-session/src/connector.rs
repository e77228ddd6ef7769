//! Locating and opening the tracker's port
//!
//! [`Connector`] covers the first two steps of a run. [`SerialConnector`]
//! is the real implementation: auto-detection through `vmac-detect` unless
//! a port is pinned, with `VSIM:` names routed to the simulated tracker.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use vmac_detect::{DiscoveredPort, PortLocator};
use vmac_sim::{VirtualTracker, VirtualTrackerConfig};

use crate::error::SessionError;
use crate::link::DeviceLink;
use crate::transport;
use crate::virtual_link::{is_virtual_port, VirtualLink};

/// Finds and opens the device for a run
pub trait Connector {
    /// Pick the port to use
    fn locate(&mut self) -> Result<DiscoveredPort, SessionError>;

    /// Open the chosen port
    fn open(&mut self, port: &DiscoveredPort) -> Result<Box<dyn DeviceLink>, SessionError>;
}

/// Connector for real hardware, with optional pinned or simulated port
#[derive(Debug)]
pub struct SerialConnector {
    locator: PortLocator,
    pinned_port: Option<String>,
    simulator: VirtualTrackerConfig,
}

impl SerialConnector {
    pub fn new(locator: PortLocator) -> Self {
        Self {
            locator,
            pinned_port: None,
            simulator: VirtualTrackerConfig::default(),
        }
    }

    /// Skip auto-detection and use this port
    pub fn with_pinned_port(mut self, port: Option<String>) -> Self {
        self.pinned_port = port;
        self
    }

    /// Configuration for `VSIM:` ports
    pub fn with_simulator(mut self, config: VirtualTrackerConfig) -> Self {
        self.simulator = config;
        self
    }
}

impl Connector for SerialConnector {
    fn locate(&mut self) -> Result<DiscoveredPort, SessionError> {
        match &self.pinned_port {
            Some(name) if is_virtual_port(name) => {
                Ok(DiscoveredPort::new(name.clone(), "Simulated tracker"))
            }
            Some(name) => {
                info!("Using pinned port {}", name);
                Ok(DiscoveredPort::new(name.clone(), "Pinned in settings"))
            }
            None => Ok(self.locator.locate()?),
        }
    }

    fn open(&mut self, port: &DiscoveredPort) -> Result<Box<dyn DeviceLink>, SessionError> {
        if is_virtual_port(&port.device) {
            let tracker = VirtualTracker::from_config(self.simulator.clone());
            info!("Opening simulated tracker {}", tracker.id());
            let link = VirtualLink::new(port.device.clone(), Rc::new(RefCell::new(tracker)));
            return Ok(Box::new(link));
        }
        Ok(Box::new(transport::open(&port.device)?))
    }
}

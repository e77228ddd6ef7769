//! Serial provisioning session for VMAC trackers
//!
//! This crate runs the operator-driven provisioning flow against one
//! tracker:
//!
//! - [`transport`] opens the port with the fixed 115200-8N1 framing
//! - [`collector`] drains device output over bounded, polled windows
//! - [`dispatch`] sends one AT command and classifies the reply
//! - [`sequencer`] walks the numbered steps from discovery to reboot
//!
//! Presentation and operator input sit behind [`Console`]; port discovery
//! and opening sit behind [`Connector`]. Ports named `VSIM:<id>` open an
//! in-process simulated tracker instead of hardware.
//!
//! # Example
//!
//! ```
//! use vmac_detect::PortLocator;
//! use vmac_session::{
//!     InterruptFlag, Provisioner, ScriptedConsole, SerialConnector, SessionTiming,
//! };
//!
//! let mut connector = SerialConnector::new(PortLocator::new())
//!     .with_pinned_port(Some("VSIM:demo".to_string()));
//! let console = ScriptedConsole::new(["y", "b2c3", "", "n"]);
//! let mut provisioner =
//!     Provisioner::new(console, SessionTiming::immediate(), InterruptFlag::new());
//!
//! let report = provisioner.run(&mut connector).unwrap();
//! assert_eq!(report.vmac.as_str(), "AAAAAAAAB2C3");
//! assert_eq!(report.verified, Some(true));
//! ```

pub mod collector;
pub mod connector;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod interrupt;
pub mod link;
pub mod sequencer;
pub mod timing;
pub mod transport;
pub mod virtual_link;

pub use collector::ResponseCollector;
pub use connector::{Connector, SerialConnector};
pub use console::{Console, ScriptedConsole, Tone};
pub use dispatch::{CommandDispatcher, CommandResult};
pub use error::SessionError;
pub use interrupt::InterruptFlag;
pub use link::{DeviceLink, OpenLink};
pub use sequencer::{ProvisionReport, Provisioner, Step};
pub use timing::SessionTiming;
pub use transport::{LinkSettings, SerialLink};
pub use virtual_link::{is_virtual_port, VirtualLink, VIRTUAL_PORT_PREFIX};

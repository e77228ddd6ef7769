//! Tracker Serial Port Detection Library
//!
//! This crate provides serial port enumeration and the heuristic that picks
//! out the USB-serial adapter a tracker is attached to.
//!
//! # Example
//!
//! ```rust,no_run
//! use vmac_detect::{DetectError, PortLocator};
//!
//! match PortLocator::new().locate() {
//!     Ok(port) => println!("Tracker on {}", port.device),
//!     Err(DetectError::NoTrackerPort { available }) => {
//!         for port in available {
//!             println!("  - {}: {}", port.device, port.description);
//!         }
//!     }
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod error;
pub mod locator;
pub mod scanner;

pub use error::DetectError;
pub use locator::{select_tracker_port, HostClass, PortLocator};
pub use scanner::{DiscoveredPort, PortScanner};

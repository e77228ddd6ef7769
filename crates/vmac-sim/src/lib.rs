//! Tracker Simulation Library
//!
//! This crate provides a simulated tracker for exercising the provisioning
//! flow without physical hardware. The tracker consumes the bytes a host
//! writes, answers the AT command set, and queues replies and log chatter
//! for the host to read.
//!
//! # Example
//!
//! ```rust
//! use vmac_sim::VirtualTracker;
//!
//! let mut tracker = VirtualTracker::new("bench");
//! tracker.process_input(b"AT+VMAC=AAAAAAAAB2C3\r\n");
//!
//! while let Some(bytes) = tracker.take_output() {
//!     println!("Tracker output: {:?}", String::from_utf8_lossy(&bytes));
//! }
//! assert_eq!(tracker.vmac().map(|v| v.suffix()), Some("B2C3"));
//! ```

pub mod tracker;

pub use tracker::{VirtualTracker, VirtualTrackerConfig};

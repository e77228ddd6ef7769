//! Serial port scanner
//!
//! This module provides serial port enumeration.

use serde::{Deserialize, Serialize};
use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::DetectError;

/// Description used when the host reports nothing about a port
const NO_DESCRIPTION: &str = "n/a";

/// A serial port the host reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPort {
    /// Device path or name (e.g., /dev/ttyUSB0, /dev/cu.usbserial-1410, COM3)
    pub device: String,
    /// Human-readable description
    pub description: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
}

impl DiscoveredPort {
    /// Create a port entry with no USB identifiers
    pub fn new(device: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            description: description.into(),
            vid: None,
            pid: None,
        }
    }

    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => {
                let description = usb
                    .product
                    .clone()
                    .or_else(|| usb.manufacturer.clone())
                    .unwrap_or_else(|| "USB Serial Device".to_string());
                Self {
                    device: name,
                    description,
                    vid: Some(usb.vid),
                    pid: Some(usb.pid),
                }
            }
            SerialPortType::PciPort => Self::new(name, "PCI Serial Port"),
            SerialPortType::BluetoothPort => Self::new(name, "Bluetooth Serial Port"),
            SerialPortType::Unknown => Self::new(name, NO_DESCRIPTION),
        }
    }

    /// "VID:PID" string for diagnostics, if known
    pub fn usb_id(&self) -> Option<String> {
        match (self.vid, self.pid) {
            (Some(vid), Some(pid)) => Some(format!("{vid:04X}:{pid:04X}")),
            _ => None,
        }
    }
}

/// Serial port scanner
#[derive(Debug, Default)]
pub struct PortScanner;

impl PortScanner {
    /// Create a new scanner
    pub fn new() -> Self {
        Self
    }

    /// Enumerate all available serial ports, in host order
    pub fn enumerate_ports(&self) -> Result<Vec<DiscoveredPort>, DetectError> {
        info!("Enumerating serial ports...");
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| DiscoveredPort::from_serialport(p.port_name, &p.port_type))
            .collect();

        if result.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", result.len());
            for port in &result {
                info!("  {} - {}", port.device, port.description);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    #[test]
    fn test_discovered_port_from_usb() {
        let usb_info = SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x0403,
            pid: 0x6001,
            serial_number: Some("12345".to_string()),
            manufacturer: Some("FTDI".to_string()),
            product: Some("FT232R USB UART".to_string()),
        });

        let port = DiscoveredPort::from_serialport("/dev/ttyUSB0".to_string(), &usb_info);

        assert_eq!(port.vid, Some(0x0403));
        assert_eq!(port.pid, Some(0x6001));
        assert_eq!(port.description, "FT232R USB UART");
        assert_eq!(port.usb_id().as_deref(), Some("0403:6001"));
    }

    #[test]
    fn test_discovered_port_falls_back_to_manufacturer() {
        let usb_info = SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x1a86,
            pid: 0x7523,
            serial_number: None,
            manufacturer: Some("QinHeng Electronics".to_string()),
            product: None,
        });

        let port = DiscoveredPort::from_serialport("COM4".to_string(), &usb_info);
        assert_eq!(port.description, "QinHeng Electronics");
    }

    #[test]
    fn test_unknown_port_has_placeholder_description() {
        let port = DiscoveredPort::from_serialport("/dev/ttyS0".to_string(), &SerialPortType::Unknown);
        assert_eq!(port.description, NO_DESCRIPTION);
        assert_eq!(port.usb_id(), None);
    }
}

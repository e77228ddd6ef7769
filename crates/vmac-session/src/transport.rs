//! Serial transport
//!
//! Opens the tracker's USB-serial port with the fixed framing the firmware
//! expects and adapts it to [`DeviceLink`].

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, trace};

use crate::error::SessionError;
use crate::link::{not_connected, DeviceLink};

/// Framing used by the tracker's serial console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Base timeout for blocking reads
    pub read_timeout: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            read_timeout: Duration::from_secs(2),
        }
    }
}

impl fmt::Display for LinkSettings {
    /// Conventional short form, e.g. "115200 8N1"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(f, "{} {}{}{}", self.baud_rate, data, parity, stop)
    }
}

/// An open serial connection to the tracker
pub struct SerialLink {
    name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialLink {
    fn port_mut(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        match self.port.as_mut() {
            Some(port) => Ok(port),
            None => Err(not_connected(&self.name)),
        }
    }
}

/// Open `port_name` with the tracker's fixed framing
///
/// Both directions are flushed so nothing from a previous session is read
/// back as a response.
pub fn open(port_name: &str) -> Result<SerialLink, SessionError> {
    let settings = LinkSettings::default();
    let connect_err = |reason: String| SessionError::Connect {
        port: port_name.to_string(),
        reason,
    };

    debug!("Opening {} at {}", port_name, settings);
    let port = serialport::new(port_name, settings.baud_rate)
        .data_bits(settings.data_bits)
        .parity(settings.parity)
        .stop_bits(settings.stop_bits)
        .flow_control(settings.flow_control)
        .timeout(settings.read_timeout)
        .open()
        .map_err(|e| connect_err(e.to_string()))?;

    port.clear(ClearBuffer::All)
        .map_err(|e| connect_err(format!("failed to clear buffers: {e}")))?;

    info!("Opened {} ({})", port_name, settings);
    Ok(SerialLink {
        name: port_name.to_string(),
        port: Some(port),
    })
}

impl DeviceLink for SerialLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        let n = self.port_mut()?.bytes_to_read()?;
        Ok(n as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port_mut()?.read(buf) {
            Ok(n) => {
                trace!("Read {} bytes: {:?}", n, String::from_utf8_lossy(&buf[..n]));
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        trace!("Writing {:?}", String::from_utf8_lossy(data));
        self.port_mut()?.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port_mut()?.flush()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.port_mut()?.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("Serial port {} released", self.name);
        }
    }
}

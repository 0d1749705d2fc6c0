//! Serial port communication implementation
//!
//! Provides port enumeration, simulator discovery, and opening of the
//! serial link to the device.
//!
//! Supports:
//! - Port enumeration with USB metadata
//! - Discovery of the USB-UART bridges used by the simulator boards
//! - Bounded-wait reads so the reader thread never blocks indefinitely

use super::{ConnectionParams, Link, LinkOpener};
use simbridge_core::{Error, LinkError, Result};

/// Description fragments identifying the simulator's USB-UART bridge
const DEVICE_MARKERS: [&str; 3] = ["SLAB", "CP210", "USB"];

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Silicon Labs CP2102")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set serial number
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }

    /// Check whether this port looks like a simulator board
    pub fn is_simulator_device(&self) -> bool {
        DEVICE_MARKERS
            .iter()
            .any(|marker| self.description.contains(marker))
    }
}

/// List available serial ports on the system
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    match serialport::available_ports() {
        Ok(ports) => Ok(ports
            .iter()
            .map(|port| {
                let info = SerialPortInfo::new(&port.port_name, get_port_description(port));

                match &port.port_type {
                    serialport::SerialPortType::UsbPort(usb_info) => {
                        let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                        if let Some(ref mfg) = usb_info.manufacturer {
                            info = info.with_manufacturer(mfg);
                        }
                        if let Some(ref serial) = usb_info.serial_number {
                            info = info.with_serial_number(serial);
                        }
                        info
                    }
                    _ => info,
                }
            })
            .collect()),
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(Error::other(format!("Failed to enumerate ports: {}", e)))
        }
    }
}

/// Find the first port that looks like a simulator board
pub fn find_device() -> Option<String> {
    select_device(&list_ports().ok()?)
}

fn select_device(ports: &[SerialPortInfo]) -> Option<String> {
    ports
        .iter()
        .find(|port| port.is_simulator_device())
        .map(|port| port.port_name.clone())
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Opens the device's serial port, discovering it first when configured to
pub struct SerialOpener {
    params: ConnectionParams,
}

impl SerialOpener {
    /// Create an opener for the given parameters
    pub fn new(params: ConnectionParams) -> Self {
        Self { params }
    }

    /// Connection parameters in use
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    fn resolve_port(&self) -> std::result::Result<String, LinkError> {
        if self.params.is_auto() {
            find_device().ok_or(LinkError::Absent)
        } else {
            Ok(self.params.port.trim().to_string())
        }
    }
}

impl LinkOpener for SerialOpener {
    fn open(&mut self) -> std::result::Result<Link, LinkError> {
        let port_name = self.resolve_port()?;
        let open_failed = |e: serialport::Error| LinkError::OpenFailed {
            port: port_name.clone(),
            reason: e.to_string(),
        };

        let port = serialport::new(&port_name, self.params.baud_rate)
            .timeout(self.params.read_timeout)
            .open()
            .map_err(open_failed)?;
        let writer = port.try_clone().map_err(open_failed)?;

        tracing::debug!(
            "Opened {} at {} baud (read timeout {:?})",
            port_name,
            self.params.baud_rate,
            self.params.read_timeout
        );

        Ok(Link::new(port_name, port, writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_device_markers() {
        assert!(SerialPortInfo::new("/dev/ttyUSB0", "USB Silicon Labs CP2102").is_simulator_device());
        assert!(SerialPortInfo::new("/dev/cu.SLAB_USBtoUART", "SLAB_USBtoUART").is_simulator_device());
        assert!(!SerialPortInfo::new("/dev/ttyS0", "PCI Serial").is_simulator_device());
        assert!(!SerialPortInfo::new("/dev/rfcomm0", "Bluetooth Serial").is_simulator_device());
    }

    #[test]
    fn test_select_first_matching_device() {
        let ports = vec![
            SerialPortInfo::new("/dev/ttyS0", "Serial Port"),
            SerialPortInfo::new("/dev/ttyUSB1", "USB Silicon Labs CP2102").with_usb_ids(0x10c4, 0xea60),
            SerialPortInfo::new("/dev/ttyUSB2", "USB Device Serial Port"),
        ];
        assert_eq!(select_device(&ports), Some("/dev/ttyUSB1".to_string()));
        assert_eq!(select_device(&ports[..1]), None);
    }

    #[test]
    fn test_port_info_builders() {
        let info = SerialPortInfo::new("COM3", "USB Device Serial Port")
            .with_manufacturer("Silicon Labs")
            .with_serial_number("0001")
            .with_usb_ids(0x10c4, 0xea60);
        assert_eq!(info.manufacturer.as_deref(), Some("Silicon Labs"));
        assert_eq!(info.serial_number.as_deref(), Some("0001"));
        assert_eq!(info.vid, Some(0x10c4));
    }
}

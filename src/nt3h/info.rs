use std::fmt;

use crate::bus::Block;

use super::CapabilityContainer;
use super::consts::*;

/// Decoded block 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DeviceInfo {
	pub bus_address: u8, // 7-bit
	pub serial: [u8; SERIAL_LEN],
	pub static_lock: [u8; 2],
	pub capability_container: CapabilityContainer,
}

impl DeviceInfo {
	pub fn from_block(block: &Block) -> Self {
		let mut serial = [0u8; SERIAL_LEN];
		serial.copy_from_slice(&block[SERIAL_OFFSET..SERIAL_OFFSET + SERIAL_LEN]);
		DeviceInfo {
			bus_address: block[BUS_ADDRESS_OFFSET] >> 1,
			serial,
			static_lock: [block[STATIC_LOCK_OFFSET], block[STATIC_LOCK_OFFSET + 1]],
			capability_container: CapabilityContainer::from_block(block),
		}
	}

	pub fn memory_size(&self) -> usize {
		self.capability_container.memory_size()
	}
}

impl fmt::Display for DeviceInfo {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "Addr: {:02X}", self.bus_address << 1)?;
		write!(f, "Serial: ")?;
		for (i, b) in self.serial.iter().enumerate() {
			if i > 0 { write!(f, ":")?; }
			write!(f, "{:02X}", b)?;
		}
		writeln!(f)?;
		writeln!(f, "Static lock bytes: {:02X}:{:02X}", self.static_lock[0], self.static_lock[1])?;
		writeln!(f, "CC: {}", self.capability_container)?;
		write!(f, "Memory Size: {} bytes", self.memory_size())
	}
}

use std::fmt;

use crate::bus::Block;

use super::consts::CAPABILITY_CONTAINER_OFFSET;

/// NDEF Capability Container (block 0, bytes 12..16)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CapabilityContainer {
	pub magic_number: u8,
	pub version: u8,
	pub mlen: u8,
	pub access_control: u8,
}

impl CapabilityContainer {
	// NDEF magic, mapping version 1.0, 872 bytes, read/write access
	pub const DEFAULT: CapabilityContainer = CapabilityContainer {
		magic_number: 0xE1,
		version: 0x10,
		mlen: 0x6D,
		access_control: 0x00,
	};

	pub fn from_bytes(bytes: [u8; 4]) -> Self {
		CapabilityContainer {
			magic_number: bytes[0],
			version: bytes[1],
			mlen: bytes[2],
			access_control: bytes[3],
		}
	}

	pub fn to_bytes(&self) -> [u8; 4] {
		[self.magic_number, self.version, self.mlen, self.access_control]
	}

	pub fn from_block(block: &Block) -> Self {
		let mut bytes = [0u8; 4];
		bytes.copy_from_slice(&block[CAPABILITY_CONTAINER_OFFSET..CAPABILITY_CONTAINER_OFFSET + 4]);
		Self::from_bytes(bytes)
	}

	pub fn store(&self, block: &mut Block) {
		block[CAPABILITY_CONTAINER_OFFSET..CAPABILITY_CONTAINER_OFFSET + 4].copy_from_slice(&self.to_bytes());
	}

	// all-zero: never written
	pub fn is_empty(&self) -> bool {
		self.to_bytes() == [0u8; 4]
	}

	pub fn is_valid(&self) -> bool {
		0 != self.magic_number
	}

	pub fn version_major(&self) -> u8 {
		self.version >> 4
	}

	pub fn version_minor(&self) -> u8 {
		self.version & 0xf
	}

	/// Usable NDEF memory in bytes.
	pub fn memory_size(&self) -> usize {
		self.mlen as usize * 8
	}

	pub fn is_read_only(&self) -> bool {
		0x0f == self.access_control & 0x0f
	}
}

impl fmt::Display for CapabilityContainer {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:02X}:{:02X}:{:02X}:{:02X}", self.magic_number, self.version, self.mlen, self.access_control)
	}
}

impl fmt::Debug for CapabilityContainer {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"{} (version {}.{}, {} bytes",
			self,
			self.version_major(),
			self.version_minor(),
			self.memory_size(),
		)?;
		if self.is_empty() { write!(f, " [EMPTY]")?; }
		if self.is_read_only() { write!(f, " [RO]")?; }
		write!(f, ")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_container() {
		let cc = CapabilityContainer::DEFAULT;
		assert!(cc.is_valid());
		assert!(!cc.is_empty());
		assert_eq!(cc.memory_size(), 872);
		assert_eq!((cc.version_major(), cc.version_minor()), (1, 0));
		assert_eq!(cc.to_string(), "E1:10:6D:00");
		assert_eq!(format!("{:?}", cc), "E1:10:6D:00 (version 1.0, 872 bytes)");
	}

	#[test]
	fn block_layout() {
		let mut block = [0x55u8; 16];
		CapabilityContainer::from_bytes([1, 2, 3, 4]).store(&mut block);
		assert_eq!(&block[..12], &[0x55; 12]);
		assert_eq!(&block[12..], &[1, 2, 3, 4]);
		assert_eq!(CapabilityContainer::from_block(&block).to_bytes(), [1, 2, 3, 4]);
	}

	#[test]
	fn empty_container() {
		let cc = CapabilityContainer::default();
		assert!(cc.is_empty());
		assert!(!cc.is_valid());
		// non-zero but without magic is neither
		let cc = CapabilityContainer::from_bytes([0, 0x10, 0, 0]);
		assert!(!cc.is_empty());
		assert!(!cc.is_valid());
	}
}

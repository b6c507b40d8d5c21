/* NXP NT3H2111 / NT3H2211 ("NTAG I2C plus"), I²C side */

use crate::Error;
use crate::bus::{
	BLOCK_SIZE,
	Block,
	BlockOperations,
	Bus,
	check_range,
};

mod capability;
mod dump;
mod info;
mod memory;
mod registers;

pub use self::capability::CapabilityContainer;
pub use self::dump::{
	HexDump,
	format_block,
};
pub use self::info::DeviceInfo;
pub use self::registers::{
	ConfigRegisters,
	SessionRegisters,
};

pub mod consts {
	// 7-bit address; block 0 byte 0 holds it shifted left by one (0xAA)
	pub const DEFAULT_I2C_ADDRESS: u8 = 0x55;

	pub const INFO_BLOCK: u8 = 0x00;
	pub const CONFIG_BLOCK: u8 = 0x3A; // 1k variant
	pub const SESSION_BLOCK: u8 = 0xFE;

	// offsets in INFO_BLOCK
	pub const BUS_ADDRESS_OFFSET: usize = 0;
	pub const SERIAL_OFFSET: usize = 1;
	pub const SERIAL_LEN: usize = 6;
	pub const STATIC_LOCK_OFFSET: usize = 10;
	pub const CAPABILITY_CONTAINER_OFFSET: usize = 12;

	// register indices, shared by configuration and session registers
	pub const NC_REG: u8 = 0;
	pub const LAST_NDEF_BLOCK: u8 = 1;
	pub const SRAM_MIRROR_BLOCK: u8 = 2;
	pub const WDT_LS: u8 = 3;
	pub const WDT_MS: u8 = 4;
	pub const I2C_CLOCK_STR: u8 = 5;
	pub const REG_LOCK: u8 = 6; // configuration only
	pub const NS_REG: u8 = 6; // session only
	pub const RFU: u8 = 7;

	pub const CONFIG_REGISTER_COUNT: usize = 8;
	pub const SESSION_REGISTER_COUNT: usize = 8;

	// NS_REG
	pub const RF_FIELD_PRESENT: u8 = 0x01;

	pub const ERASE_VALUE: u8 = 0x00;
}

use self::consts::*;

/// Handle for one NFC device.
///
/// Owns the bus; every operation takes `&mut self`, so concurrent use of one
/// handle has to be serialized by the owner (e.g. a `Mutex` around it).
/// Read-modify-write operations are not atomic on the device: if the bus fails
/// between reading and writing back, the device keeps its old content.
pub struct Nt3h<B: Bus> {
	bus: Option<B>,
	cc: Option<CapabilityContainer>,
}

impl<B: Bus> Nt3h<B> {
	pub fn new(bus: B) -> Self {
		Nt3h {
			bus: Some(bus),
			cc: None,
		}
	}

	pub fn bus(&self) -> Option<&B> {
		self.bus.as_ref()
	}

	pub fn bus_mut(&mut self) -> Option<&mut B> {
		self.bus.as_mut()
	}

	pub(crate) fn attached(&mut self) -> Result<&mut B, Error> {
		self.bus.as_mut().ok_or(Error::NullReference)
	}

	/// Check the device acknowledges on the bus.
	pub fn check(&mut self) -> Result<(), Error> {
		self.attached()?.probe().map_err(|e| Error::unresponsive("probe", e))
	}

	/// Probe the device and load the Capability Container.
	///
	/// An all-zero container is taken as "never written" and programmed with
	/// `CapabilityContainer::DEFAULT`.
	pub fn init(&mut self) -> Result<CapabilityContainer, Error> {
		if let Err(e) = self.check() {
			info!("NFC: device not responding");
			return Err(e);
		}

		let cc = match self.read_capability_container() {
			Ok(cc) => cc,
			Err(e) => {
				info!("NFC: unable to read Capability Container");
				return Err(e);
			}
		};

		if cc.is_empty() {
			info!("NFC: Capability Container is empty");
			let cc = CapabilityContainer::DEFAULT;
			if let Err(e) = self.write_capability_container(cc) {
				info!("NFC: unable to program Capability Container");
				return Err(e);
			}
			info!("NFC: programmed Capability Container ({})", cc);
			return Ok(cc);
		}

		if !cc.is_valid() {
			warn!("NFC: Capability Container without magic number: {:?}", cc);
		}
		Ok(cc)
	}

	/// Release the bus; later operations fail with `Error::NullReference`.
	pub fn deinit(&mut self) -> Option<B> {
		self.cc = None;
		self.bus.take()
	}

	/// Capability Container as last read or written.
	pub fn capability_container(&self) -> Option<CapabilityContainer> {
		self.cc
	}

	pub fn read_capability_container(&mut self) -> Result<CapabilityContainer, Error> {
		let block = self.read_block(INFO_BLOCK)?;
		let cc = CapabilityContainer::from_block(&block);
		self.cc = Some(cc);
		Ok(cc)
	}

	pub fn write_capability_container(&mut self, cc: CapabilityContainer) -> Result<(), Error> {
		self.modify_block(INFO_BLOCK, |block| cc.store(block))?;
		self.cc = Some(cc);
		Ok(())
	}

	pub fn read_device_info(&mut self) -> Result<DeviceInfo, Error> {
		let block = self.read_block(INFO_BLOCK)?;
		let info = DeviceInfo::from_block(&block);
		self.cc = Some(info.capability_container);
		Ok(info)
	}

	/// Program the (7-bit) I²C address the device answers to after the next
	/// power cycle.
	pub fn write_bus_address(&mut self, address: u8) -> Result<(), Error> {
		if address > 0x7f {
			return Err(Error::invalid_argument(format!("I2C address 0x{:02x} has more than 7 bits", address)));
		}
		self.modify_block(INFO_BLOCK, |block| block[BUS_ADDRESS_OFFSET] = address << 1)
	}

	/// Raw block access, e.g. for dumping memory.
	pub fn read_blocks(&mut self, address: u8, count: usize) -> Result<Vec<Block>, Error> {
		check_range(address, count)?;
		let mut blocks = vec![[0u8; BLOCK_SIZE]; count];
		self.attached()?.read_blocks(address, &mut blocks)?;
		Ok(blocks)
	}

	pub(crate) fn read_block(&mut self, address: u8) -> Result<Block, Error> {
		let mut block = [[0u8; BLOCK_SIZE]];
		self.attached()?.read_blocks(address, &mut block)?;
		Ok(block[0])
	}

	// read block, let `f` change it, write it back
	pub(crate) fn modify_block<F>(&mut self, address: u8, f: F) -> Result<(), Error>
	where
		F: FnOnce(&mut Block),
	{
		let bus = self.attached()?;
		let mut block = [[0u8; BLOCK_SIZE]];
		bus.read_blocks(address, &mut block)?;
		f(&mut block[0]);
		bus.write_blocks(address, &block)
	}
}

use crate::Error;

use super::{
	ADDRESS_LIMIT,
	Block,
	Bus,
	EEPROM_WRITE_DELAY_MS,
	SRAM_BASE,
	SRAM_LEN,
};

// base and end of the window are exclusive
pub fn is_sram(address: usize) -> bool {
	address > SRAM_BASE && address < SRAM_BASE + SRAM_LEN
}

pub(crate) fn check_range(address: u8, count: usize) -> Result<(), Error> {
	if 0 == count {
		return Err(Error::invalid_argument("zero block count"));
	}
	if address as usize + count > ADDRESS_LIMIT {
		return Err(Error::invalid_argument(format!(
			"{} blocks starting at 0x{:02x} exceed the block address space", count, address
		)));
	}
	Ok(())
}

/// Multi-block transfers on top of single block transactions.
///
/// Blocks are transferred in order; the first failing block aborts the
/// operation. Blocks written before the failure stay written.
pub trait BlockOperations: Bus {
	fn read_blocks(&mut self, address: u8, blocks: &mut [Block]) -> Result<(), Error> {
		check_range(address, blocks.len())?;
		for (i, block) in blocks.iter_mut().enumerate() {
			let block_address = (address as usize + i) as u8;
			trace!("read block 0x{:02x}", block_address);
			self.read_block(block_address, block).map_err(|e| {
				Error::unresponsive(format!("read block 0x{:02x}", block_address), e)
			})?;
		}
		Ok(())
	}

	fn write_blocks(&mut self, address: u8, blocks: &[Block]) -> Result<(), Error> {
		check_range(address, blocks.len())?;
		for (i, block) in blocks.iter().enumerate() {
			let block_address = (address as usize + i) as u8;
			trace!("write block 0x{:02x}", block_address);
			self.write_block(block_address, block).map_err(|e| {
				Error::unresponsive(format!("write block 0x{:02x}", block_address), e)
			})?;
			if !is_sram(block_address as usize) {
				self.delay_ms(EEPROM_WRITE_DELAY_MS);
			}
		}
		Ok(())
	}
}

impl<B: Bus + ?Sized> BlockOperations for B {
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sim::{
		Event,
		SimulatedDevice,
	};

	#[test]
	fn sram_window_bounds() {
		assert!(!is_sram(SRAM_BASE));
		assert!(is_sram(SRAM_BASE + 1));
		assert!(is_sram(SRAM_BASE + SRAM_LEN - 1));
		assert!(!is_sram(SRAM_BASE + SRAM_LEN));
		assert!(!is_sram(0x10));
	}

	#[test]
	fn read_blocks_in_order() {
		let mut dev = SimulatedDevice::blank();
		dev.set_block(0x11, [0x11; 16]);
		dev.set_block(0x12, [0x12; 16]);

		let mut blocks = [[0u8; 16]; 2];
		dev.read_blocks(0x11, &mut blocks).unwrap();

		assert_eq!(blocks, [[0x11; 16], [0x12; 16]]);
		assert_eq!(dev.take_events(), vec![Event::ReadBlock(0x11), Event::ReadBlock(0x12)]);
	}

	#[test]
	fn eeprom_write_delays_every_block() {
		let mut dev = SimulatedDevice::blank();
		dev.write_blocks(0x04, &[[1; 16], [2; 16], [3; 16]]).unwrap();

		assert_eq!(dev.take_events(), vec![
			Event::WriteBlock(0x04), Event::Delay(4),
			Event::WriteBlock(0x05), Event::Delay(4),
			Event::WriteBlock(0x06), Event::Delay(4),
		]);
		assert_eq!(dev.block(0x05), &[2; 16]);
	}

	#[test]
	fn sram_write_has_no_delay() {
		let mut dev = SimulatedDevice::blank();
		dev.write_blocks(0xF9, &[[0xAB; 16], [0xCD; 16]]).unwrap();

		assert_eq!(dev.take_events(), vec![Event::WriteBlock(0xF9), Event::WriteBlock(0xFA)]);
		assert!(dev.delays().is_empty());
	}

	#[test]
	fn sram_base_itself_is_delayed() {
		let mut dev = SimulatedDevice::blank();
		dev.write_blocks(0xF8, &[[0; 16]]).unwrap();
		assert_eq!(dev.delays(), vec![4]);
	}

	#[test]
	fn empty_transfer_rejected_without_io() {
		let mut dev = SimulatedDevice::blank();
		let mut none: [Block; 0] = [];
		assert!(matches!(dev.read_blocks(0, &mut none), Err(Error::InvalidArgument(_))));
		assert!(matches!(dev.write_blocks(0, &none), Err(Error::InvalidArgument(_))));
		assert!(dev.take_events().is_empty());
	}

	#[test]
	fn transfer_past_address_space_rejected() {
		let mut dev = SimulatedDevice::blank();
		let mut blocks = [[0u8; 16]; 2];
		assert!(matches!(dev.read_blocks(0xFF, &mut blocks), Err(Error::InvalidArgument(_))));
		assert!(dev.read_blocks(0xFE, &mut blocks).is_ok());
	}

	#[test]
	fn failing_block_aborts_write() {
		let mut dev = SimulatedDevice::blank();
		dev.fail_at(Some(0x21));

		let res = dev.write_blocks(0x20, &[[7; 16], [8; 16], [9; 16]]);
		assert!(matches!(res, Err(Error::DeviceUnresponsive { .. })));

		// first block stays written, nothing after the failure is attempted
		assert_eq!(dev.block(0x20), &[7; 16]);
		assert_eq!(dev.block(0x22), &[0; 16]);
		assert_eq!(dev.take_events(), vec![
			Event::WriteBlock(0x20), Event::Delay(4),
			Event::WriteBlock(0x21),
		]);
	}
}

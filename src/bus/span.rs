use super::{
	ADDRESS_LIMIT,
	BLOCK_SIZE,
};

/// Blocks covering a byte range.
///
/// `offset` is always inside the first block; `blocks` follows the device
/// driver's rule: whole blocks for `length`, plus one if the range crosses
/// into the following block. This can be one block more than strictly needed
/// (e.g. offset 0, length 17 gives 3 blocks); the extra block is read and
/// written back unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Span {
	pub address: usize,
	pub offset: usize,
	pub blocks: usize,
}

impl Span {
	// pure arithmetic, accepts anything (even zero length)
	pub fn new(address: u8, offset: usize, length: usize) -> Self {
		let address = address as usize + offset / BLOCK_SIZE;
		let offset = offset % BLOCK_SIZE;

		let mut blocks = length / BLOCK_SIZE;
		if 0 != length % BLOCK_SIZE {
			blocks += 1;
		}
		// offset + length > BLOCK_SIZE, without overflow
		if length > BLOCK_SIZE - offset {
			blocks += 1;
		}

		Span {
			address,
			offset,
			blocks,
		}
	}

	/// Whether all blocks are addressable on the bus.
	pub fn fits(&self) -> bool {
		self.blocks <= ADDRESS_LIMIT && self.address + self.blocks <= ADDRESS_LIMIT
	}

	/// First block address; `None` if the span doesn't fit the address space.
	pub fn first_address(&self) -> Option<u8> {
		if self.fits() {
			Some(self.address as u8)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn normalizes_large_offset() {
		let span = Span::new(0x02, 35, 1);
		assert_eq!(span, Span { address: 0x04, offset: 3, blocks: 1 });
	}

	#[test]
	fn straddling_write() {
		// 6 bytes left in block 0, 14 spill over; formula gives 2 + 1
		let span = Span::new(0x00, 10, 20);
		assert_eq!(span, Span { address: 0x00, offset: 10, blocks: 3 });
	}

	#[test]
	fn exact_block() {
		assert_eq!(Span::new(0x10, 0, 16).blocks, 1);
		assert_eq!(Span::new(0x10, 0, 15).blocks, 1);
		assert_eq!(Span::new(0x10, 1, 15).blocks, 1);
		assert_eq!(Span::new(0x10, 1, 16).blocks, 2);
		assert_eq!(Span::new(0x10, 0, 17).blocks, 3);
	}

	#[test]
	fn zero_length_is_not_rejected() {
		assert_eq!(Span::new(0x05, 4, 0), Span { address: 0x05, offset: 4, blocks: 0 });
	}

	#[test]
	fn address_space_bound() {
		assert!(Span::new(0xFF, 0, 16).fits());
		assert_eq!(Span::new(0xFF, 0, 16).first_address(), Some(0xFF));
		assert!(!Span::new(0xFF, 15, 2).fits());
		assert!(!Span::new(0xFF, 16, 1).fits());
		assert_eq!(Span::new(0x00, 0, usize::max_value()).first_address(), None);
	}

	proptest! {
		#[test]
		fn offset_inside_first_block(address: u8, offset in 0usize..0x10000, length in 0usize..0x10000) {
			let span = Span::new(address, offset, length);
			prop_assert!(span.offset < BLOCK_SIZE);
			prop_assert_eq!(span.address * BLOCK_SIZE + span.offset, address as usize * BLOCK_SIZE + offset);
		}

		#[test]
		fn blocks_cover_range(address: u8, offset: usize, length in 0usize..(usize::max_value() / 2)) {
			let span = Span::new(address, offset, length);
			prop_assert!(span.blocks * BLOCK_SIZE >= span.offset + length);
		}
	}
}

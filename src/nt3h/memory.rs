use crate::Error;
use crate::bus::{
	BLOCK_SIZE,
	Block,
	BlockOperations,
	Bus,
	Span,
};

use super::Nt3h;
use super::consts::ERASE_VALUE;

// byte `pos` of the flattened block buffer
fn byte_mut(blocks: &mut [Block], pos: usize) -> &mut u8 {
	&mut blocks[pos / BLOCK_SIZE][pos % BLOCK_SIZE]
}

fn checked_span(address: u8, offset: usize, length: usize) -> Result<(Span, u8), Error> {
	if 0 == length {
		return Err(Error::invalid_argument("zero length"));
	}
	let span = Span::new(address, offset, length);
	match span.first_address() {
		Some(first) => Ok((span, first)),
		None => Err(Error::invalid_argument(format!(
			"{} bytes at block 0x{:02x} + {} exceed the block address space", length, address, offset
		))),
	}
}

impl<B: Bus> Nt3h<B> {
	// read all blocks covering the span
	fn stage(&mut self, address: u8, offset: usize, length: usize) -> Result<(Span, u8, Vec<Block>), Error> {
		let (span, first) = checked_span(address, offset, length)?;
		let mut blocks = vec![[0u8; BLOCK_SIZE]; span.blocks];
		self.attached()?.read_blocks(first, &mut blocks)?;
		Ok((span, first, blocks))
	}

	fn splice<I>(&mut self, address: u8, offset: usize, length: usize, data: I) -> Result<(), Error>
	where
		I: Iterator<Item = u8>,
	{
		let (span, first, mut blocks) = self.stage(address, offset, length)?;
		trace!("splicing {} bytes at 0x{:02x}+{} ({} blocks)", length, first, span.offset, span.blocks);
		for (i, b) in data.take(length).enumerate() {
			*byte_mut(&mut blocks, span.offset + i) = b;
		}
		self.attached()?.write_blocks(first, &blocks)
	}

	/// Read `data.len()` bytes starting `offset` bytes after the start of block
	/// `address`; `offset` may exceed the block size.
	pub fn read_bytes(&mut self, address: u8, offset: usize, data: &mut [u8]) -> Result<(), Error> {
		let (span, _, mut blocks) = self.stage(address, offset, data.len())?;
		for (i, b) in data.iter_mut().enumerate() {
			*b = *byte_mut(&mut blocks, span.offset + i);
		}
		Ok(())
	}

	/// Write `data` starting `offset` bytes after the start of block `address`.
	///
	/// Bytes sharing a block with the range keep their content.
	pub fn write_bytes(&mut self, address: u8, offset: usize, data: &[u8]) -> Result<(), Error> {
		debug!("write {} bytes at block 0x{:02x} + {}", data.len(), address, offset);
		self.splice(address, offset, data.len(), data.iter().cloned())
	}

	/// Reset `length` bytes to `0x00`.
	pub fn erase_bytes(&mut self, address: u8, offset: usize, length: usize) -> Result<(), Error> {
		debug!("erase {} bytes at block 0x{:02x} + {}", length, address, offset);
		self.splice(address, offset, length, std::iter::repeat(ERASE_VALUE))
	}
}

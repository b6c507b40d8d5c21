use std::fmt::{
	self,
	Write,
};

use crate::bus::Block;

fn printable(b: u8) -> char {
	if b >= 33 && b <= 126 { b as char } else { '.' }
}

/// One line per block: address, then four groups of four bytes in hex with
/// their printable characters.
pub fn format_block(address: u8, block: &Block) -> String {
	let mut line = format!("0x{:02X}", address);
	for group in block.chunks(4) {
		line.push('\t');
		for b in group {
			let _ = write!(line, "{:02X} ", b);
		}
		line.push_str("| ");
		line.extend(group.iter().cloned().map(printable));
		line.push_str(" |");
	}
	line
}

pub struct HexDump<'a> {
	pub address: u8,
	pub blocks: &'a [Block],
}

impl<'a> fmt::Display for HexDump<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, block) in self.blocks.iter().enumerate() {
			let address = self.address.wrapping_add(i as u8);
			if i > 0 { writeln!(f)?; }
			write!(f, "{}", format_block(address, block))?;
		}
		Ok(())
	}
}

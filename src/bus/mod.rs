/// Memory of the NTAG I2C family as seen from the I²C side.
///
/// Memory is organized in 16-byte blocks, addressed by a single byte. Every
/// memory transaction moves exactly one block:
/// - READ: send the block address, then receive 16 bytes
/// - WRITE: send the block address followed by 16 bytes
///
/// EEPROM blocks need ~4ms to program after a write; the SRAM window
/// (mapped behind `SRAM_BASE`) completes in ~0.4ms.
///
/// Session registers don't follow the block scheme at all, they are accessed
/// with short raw transactions (see `Bus::transmit` / `Bus::receive`).

mod blocks;
mod hardware;
mod span;

pub use self::blocks::{
	BlockOperations,
	is_sram,
};
pub(crate) use self::blocks::check_range;

pub use self::hardware::{
	Bus,
	reliable_sleep,
};

pub use self::span::Span;

pub const BLOCK_SIZE: usize = 16;

pub type Block = [u8; BLOCK_SIZE];

// block addresses are a single byte on the bus
pub const ADDRESS_LIMIT: usize = 0x100;

pub const SRAM_BASE: usize = 0xF8;
pub const SRAM_LEN: usize = 64;

// programming time for one EEPROM block
pub const EEPROM_WRITE_DELAY_MS: u32 = 4;

/// Configuration registers live in EEPROM block `CONFIG_BLOCK` and go through
/// the block read-modify-write path. Session registers are volatile copies
/// (loaded from the configuration at power-on) which can't be read as a
/// block; every access is a raw transaction:
/// - read:  send [SESSION_BLOCK, REGA], receive [REGDAT]
/// - write: send [SESSION_BLOCK, REGA, MASK, REGDAT], the device only
///   changes the bits set in MASK

use std::fmt;

use crate::Error;
use crate::bus::{
	BLOCK_SIZE,
	Bus,
};

use super::Nt3h;
use super::consts::*;

fn check_config_register(reg: u8) -> Result<(), Error> {
	if reg as usize >= BLOCK_SIZE {
		return Err(Error::invalid_argument(format!("configuration register {} outside of block", reg)));
	}
	Ok(())
}

fn check_session_register(reg: u8) -> Result<(), Error> {
	if reg as usize >= SESSION_REGISTER_COUNT {
		return Err(Error::invalid_argument(format!("no session register {}", reg)));
	}
	Ok(())
}

impl<B: Bus> Nt3h<B> {
	pub fn read_config(&mut self, reg: u8) -> Result<u8, Error> {
		check_config_register(reg)?;
		let block = self.read_block(CONFIG_BLOCK)?;
		Ok(block[reg as usize])
	}

	/// Stores `(old & mask) | value`: bits cleared in `mask` are replaced,
	/// bits set in `mask` are kept (unless set in `value`).
	pub fn write_config(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Error> {
		check_config_register(reg)?;
		debug!("config register {}: mask 0x{:02x}, value 0x{:02x}", reg, mask, value);
		self.modify_block(CONFIG_BLOCK, |block| {
			let r = &mut block[reg as usize];
			*r = (*r & mask) | value;
		})
	}

	pub fn read_register(&mut self, reg: u8) -> Result<u8, Error> {
		check_session_register(reg)?;
		let bus = self.attached()?;
		bus.transmit(&[SESSION_BLOCK, reg]).map_err(|e| {
			Error::unresponsive(format!("select session register {}", reg), e)
		})?;
		let mut data = [0u8];
		bus.receive(&mut data).map_err(|e| {
			Error::unresponsive(format!("read session register {}", reg), e)
		})?;
		Ok(data[0])
	}

	/// Only bits set in `mask` are changed (by the device).
	pub fn write_register(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Error> {
		check_session_register(reg)?;
		debug!("session register {}: mask 0x{:02x}, value 0x{:02x}", reg, mask, value);
		self.attached()?.transmit(&[SESSION_BLOCK, reg, mask, value]).map_err(|e| {
			Error::unresponsive(format!("write session register {}", reg), e)
		})
	}

	/// Whether an RF field is present on the antenna (NS_REG).
	pub fn read_field_present(&mut self) -> Result<bool, Error> {
		Ok(0 != self.read_register(NS_REG)? & RF_FIELD_PRESENT)
	}

	pub fn read_config_registers(&mut self) -> Result<ConfigRegisters, Error> {
		let block = self.read_block(CONFIG_BLOCK)?;
		let mut regs = [0u8; CONFIG_REGISTER_COUNT];
		regs.copy_from_slice(&block[..CONFIG_REGISTER_COUNT]);
		Ok(ConfigRegisters(regs))
	}

	// RFU (7) is left out
	pub fn read_session_registers(&mut self) -> Result<SessionRegisters, Error> {
		let mut regs = [0u8; SESSION_REGISTER_COUNT - 1];
		for (reg, value) in regs.iter_mut().enumerate() {
			*value = self.read_register(reg as u8)?;
		}
		Ok(SessionRegisters(regs))
	}
}

fn wdt(ls: u8, ms: u8) -> u16 {
	u16::from(ls) | u16::from(ms) << 8
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ConfigRegisters(pub [u8; CONFIG_REGISTER_COUNT]);

impl ConfigRegisters {
	pub fn get(&self, reg: u8) -> u8 {
		self.0[reg as usize]
	}

	pub fn watchdog(&self) -> u16 {
		wdt(self.get(WDT_LS), self.get(WDT_MS))
	}
}

impl fmt::Display for ConfigRegisters {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "           NC_REG: 0x{:02X}", self.get(NC_REG))?;
		writeln!(f, "  LAST_NDEF_BLOCK: 0x{:02X}", self.get(LAST_NDEF_BLOCK))?;
		writeln!(f, "SRAM_MIRROR_BLOCK: 0x{:02X}", self.get(SRAM_MIRROR_BLOCK))?;
		writeln!(f, "           WDT_LS: 0x{:02X}", self.get(WDT_LS))?;
		writeln!(f, "           WDT_MS: 0x{:02X}", self.get(WDT_MS))?;
		writeln!(f, "    I2C_CLOCK_STR: 0x{:02X}", self.get(I2C_CLOCK_STR))?;
		writeln!(f, "         REG_LOCK: 0x{:02X}", self.get(REG_LOCK))?;
		write!(f, "              RFU: 0x{:02X}", self.get(RFU))
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SessionRegisters(pub [u8; SESSION_REGISTER_COUNT - 1]);

impl SessionRegisters {
	pub fn get(&self, reg: u8) -> u8 {
		self.0[reg as usize]
	}

	pub fn watchdog(&self) -> u16 {
		wdt(self.get(WDT_LS), self.get(WDT_MS))
	}

	pub fn rf_field_present(&self) -> bool {
		0 != self.get(NS_REG) & RF_FIELD_PRESENT
	}
}

impl fmt::Display for SessionRegisters {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "           NC_REG: 0x{:02X}", self.get(NC_REG))?;
		writeln!(f, "  LAST_NDEF_BLOCK: 0x{:02X}", self.get(LAST_NDEF_BLOCK))?;
		writeln!(f, "SRAM_MIRROR_BLOCK: 0x{:02X}", self.get(SRAM_MIRROR_BLOCK))?;
		writeln!(f, "           WDT_LS: 0x{:02X}", self.get(WDT_LS))?;
		writeln!(f, "           WDT_MS: 0x{:02X}", self.get(WDT_MS))?;
		writeln!(f, "    I2C_CLOCK_STR: 0x{:02X}", self.get(I2C_CLOCK_STR))?;
		write!(f, "           NS_REG: 0x{:02X}", self.get(NS_REG))
	}
}

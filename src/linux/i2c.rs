use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::time::Duration;

use libc::{
	c_ulong,
	ioctl,
};

use crate::bus::{
	BLOCK_SIZE,
	Block,
	Bus,
};
use crate::nt3h::consts::DEFAULT_I2C_ADDRESS;

// from <linux/i2c-dev.h>
const I2C_RETRIES: c_ulong = 0x0701;
const I2C_TIMEOUT: c_ulong = 0x0702; // units of 10 ms
const I2C_SLAVE: c_ulong = 0x0703;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct I2cConfig {
	pub path: PathBuf,
	pub address: u8, // 7-bit
	pub timeout: Duration,
	pub retries: u32,
}

impl Default for I2cConfig {
	fn default() -> Self {
		I2cConfig {
			path: PathBuf::from("/dev/i2c-1"),
			address: DEFAULT_I2C_ADDRESS,
			timeout: Duration::from_millis(1000),
			retries: 5,
		}
	}
}

/// NT3H on a Linux `i2c-dev` bus.
///
/// Each `read`/`write` on the character device is a complete I²C transaction
/// (with STOP), which is what the NT3H expects for memory access.
#[derive(Debug)]
pub struct I2cDevice {
	file: fs::File,
	address: u8,
}

fn set_option(file: &fs::File, request: c_ulong, value: c_ulong) -> io::Result<()> {
	let res = unsafe { ioctl(file.as_raw_fd(), request as _, value) };
	if res < 0 {
		return Err(io::Error::last_os_error());
	}
	Ok(())
}

impl I2cDevice {
	pub fn address(&self) -> u8 {
		self.address
	}

	fn write_exact(&mut self, data: &[u8]) -> io::Result<()> {
		// a transaction must not be split
		let l = self.file.write(data)?;
		if l != data.len() {
			Err(io::Error::new(io::ErrorKind::Other, "failed to write whole transaction"))
		} else {
			Ok(())
		}
	}

	fn read_exact(&mut self, data: &mut [u8]) -> io::Result<()> {
		let l = self.file.read(data)?;
		if l != data.len() {
			Err(io::Error::new(io::ErrorKind::UnexpectedEof, "failed to read whole transaction"))
		} else {
			Ok(())
		}
	}
}

impl Bus for I2cDevice {
	fn read_block(&mut self, address: u8, block: &mut Block) -> io::Result<()> {
		self.write_exact(&[address])?;
		self.read_exact(block)
	}

	fn write_block(&mut self, address: u8, block: &Block) -> io::Result<()> {
		let mut buf = [0u8; BLOCK_SIZE + 1];
		buf[0] = address;
		buf[1..].copy_from_slice(block);
		self.write_exact(&buf)
	}

	fn transmit(&mut self, data: &[u8]) -> io::Result<()> {
		self.write_exact(data)
	}

	fn receive(&mut self, data: &mut [u8]) -> io::Result<()> {
		self.read_exact(data)
	}
}

pub fn open_i2c(config: &I2cConfig) -> crate::AResult<I2cDevice> {
	ensure!(config.address <= 0x7f, "I2C address 0x{:02x} has more than 7 bits", config.address);

	with_context!(("couldn't open I2C bus {}", config.path.display()), {
		let file = fs::OpenOptions::new()
			.read(true)
			.write(true)
			.open(&config.path)?;

		let timeout = (config.timeout.as_millis() / 10).max(1) as c_ulong;
		set_option(&file, I2C_TIMEOUT, timeout)?;
		set_option(&file, I2C_RETRIES, c_ulong::from(config.retries))?;
		set_option(&file, I2C_SLAVE, c_ulong::from(config.address))?;

		debug!("opened {} for device 0x{:02x}", config.path.display(), config.address);

		Ok(I2cDevice {
			file,
			address: config.address,
		})
	})
}

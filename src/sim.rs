/// In-memory NT3H device.
///
/// Behaves like the real device on the bus: block reads/writes on a 256 block
/// memory image, session registers through raw transactions. Every bus
/// operation (and every requested delay) is recorded, delays don't sleep.

use std::fs;
use std::io;
use std::path::Path;

use crate::bus::{
	ADDRESS_LIMIT,
	BLOCK_SIZE,
	Block,
	Bus,
};
use crate::nt3h::consts::{
	CONFIG_BLOCK,
	SESSION_BLOCK,
	SESSION_REGISTER_COUNT,
};

// memory content as shipped
const FACTORY_BLOCKS: [(u8, Block); 4] = [
	(0x00, [0xAA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xE1, 0x10, 0x6D, 0x00]),
	(0x38, [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF]),
	(0x39, [0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
	(0x3A, [0x01, 0x00, 0xF8, 0x48, 0x08, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
];

pub const IMAGE_LEN: usize = ADDRESS_LIMIT * BLOCK_SIZE;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Event {
	ReadBlock(u8),
	WriteBlock(u8),
	Transmit(Vec<u8>),
	Receive(usize),
	Probe,
	Delay(u32),
}

#[derive(Clone, Debug)]
pub struct SimulatedDevice {
	memory: Vec<Block>,
	session: [u8; SESSION_REGISTER_COUNT],
	selected_register: Option<u8>,
	present: bool,
	failing_block: Option<u8>,
	events: Vec<Event>,
}

fn nak(msg: &str) -> io::Error {
	io::Error::new(io::ErrorKind::Other, msg.to_string())
}

impl SimulatedDevice {
	/// Device with factory memory content.
	pub fn new() -> Self {
		let mut dev = Self::blank();
		for (address, block) in FACTORY_BLOCKS.iter() {
			dev.memory[*address as usize] = *block;
		}
		dev.power_on_reset();
		dev
	}

	/// Device with all memory zeroed (including the Capability Container).
	pub fn blank() -> Self {
		SimulatedDevice {
			memory: vec![[0u8; BLOCK_SIZE]; ADDRESS_LIMIT],
			session: [0u8; SESSION_REGISTER_COUNT],
			selected_register: None,
			present: true,
			failing_block: None,
			events: Vec::new(),
		}
	}

	pub fn from_image(image: &[u8]) -> crate::AResult<Self> {
		ensure!(image.len() == IMAGE_LEN, "memory image must be {} bytes, got {}", IMAGE_LEN, image.len());
		let mut dev = Self::blank();
		for (block, chunk) in dev.memory.iter_mut().zip(image.chunks(BLOCK_SIZE)) {
			block.copy_from_slice(chunk);
		}
		dev.power_on_reset();
		Ok(dev)
	}

	pub fn image(&self) -> Vec<u8> {
		self.memory.iter().flat_map(|b| b.iter().cloned()).collect()
	}

	/// Load an image file; a missing file gives a factory fresh device.
	pub fn load<P: AsRef<Path>>(path: P) -> crate::AResult<Self> {
		let path = path.as_ref();
		with_context!(("couldn't load memory image {}", path.display()), {
			match fs::read(path) {
				Ok(image) => Self::from_image(&image),
				Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
					info!("{} doesn't exist, starting with factory memory", path.display());
					Ok(Self::new())
				},
				Err(e) => Err(e.into()),
			}
		})
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::AResult<()> {
		let path = path.as_ref();
		with_context!(("couldn't save memory image {}", path.display()), {
			fs::write(path, self.image())?;
			Ok(())
		})
	}

	// session registers are loaded from the configuration block
	fn power_on_reset(&mut self) {
		let config = self.memory[CONFIG_BLOCK as usize];
		self.session.copy_from_slice(&config[..SESSION_REGISTER_COUNT]);
		self.selected_register = None;
	}

	pub fn block(&self, address: u8) -> &Block {
		&self.memory[address as usize]
	}

	pub fn set_block(&mut self, address: u8, block: Block) {
		self.memory[address as usize] = block;
	}

	pub fn session_register(&self, reg: u8) -> u8 {
		self.session[reg as usize]
	}

	pub fn set_session_register(&mut self, reg: u8, value: u8) {
		self.session[reg as usize] = value;
	}

	/// A device that isn't present NAKs everything.
	pub fn set_present(&mut self, present: bool) {
		self.present = present;
	}

	/// Make transfers of one block fail.
	pub fn fail_at(&mut self, address: Option<u8>) {
		self.failing_block = address;
	}

	pub fn events(&self) -> &[Event] {
		&self.events
	}

	pub fn take_events(&mut self) -> Vec<Event> {
		std::mem::replace(&mut self.events, Vec::new())
	}

	pub fn delays(&self) -> Vec<u32> {
		self.events.iter().filter_map(|e| match e {
			Event::Delay(ms) => Some(*ms),
			_ => None,
		}).collect()
	}

	fn check_block(&self, address: u8) -> io::Result<()> {
		if !self.present {
			return Err(nak("no device"));
		}
		if self.failing_block == Some(address) {
			return Err(nak("block transfer failed"));
		}
		Ok(())
	}
}

impl Default for SimulatedDevice {
	fn default() -> Self {
		Self::new()
	}
}

impl Bus for SimulatedDevice {
	fn read_block(&mut self, address: u8, block: &mut Block) -> io::Result<()> {
		self.events.push(Event::ReadBlock(address));
		self.check_block(address)?;
		*block = self.memory[address as usize];
		Ok(())
	}

	fn write_block(&mut self, address: u8, block: &Block) -> io::Result<()> {
		self.events.push(Event::WriteBlock(address));
		self.check_block(address)?;
		self.memory[address as usize] = *block;
		Ok(())
	}

	fn transmit(&mut self, data: &[u8]) -> io::Result<()> {
		self.events.push(Event::Transmit(data.to_vec()));
		if !self.present {
			return Err(nak("no device"));
		}
		match *data {
			[SESSION_BLOCK, reg] if (reg as usize) < SESSION_REGISTER_COUNT => {
				self.selected_register = Some(reg);
				Ok(())
			},
			[SESSION_BLOCK, reg, mask, value] if (reg as usize) < SESSION_REGISTER_COUNT => {
				let r = &mut self.session[reg as usize];
				*r = (*r & !mask) | (value & mask);
				Ok(())
			},
			_ => Err(io::Error::new(io::ErrorKind::InvalidInput, format!("unsupported transaction {:02x?}", data))),
		}
	}

	fn receive(&mut self, data: &mut [u8]) -> io::Result<()> {
		self.events.push(Event::Receive(data.len()));
		if !self.present {
			return Err(nak("no device"));
		}
		for b in data.iter_mut() {
			*b = 0;
		}
		if let Some(reg) = self.selected_register.take() {
			if let Some(first) = data.first_mut() {
				*first = self.session[reg as usize];
			}
		}
		Ok(())
	}

	fn probe(&mut self) -> io::Result<()> {
		self.events.push(Event::Probe);
		if !self.present {
			return Err(nak("no device"));
		}
		Ok(())
	}

	fn delay_ms(&mut self, ms: u32) {
		self.events.push(Event::Delay(ms));
	}
}

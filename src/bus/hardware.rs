use std::io;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

use super::Block;

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

pub trait Bus {
	// one memory transaction each; `address` is the block address
	fn read_block(&mut self, address: u8, block: &mut Block) -> io::Result<()>;
	fn write_block(&mut self, address: u8, block: &Block) -> io::Result<()>;

	// raw transactions without block semantics (session registers)
	fn transmit(&mut self, data: &[u8]) -> io::Result<()>;
	fn receive(&mut self, data: &mut [u8]) -> io::Result<()>;

	// succeeds if the device acknowledges its bus address
	fn probe(&mut self) -> io::Result<()> {
		let mut buf = [0u8];
		self.receive(&mut buf)
	}

	fn delay_ms(&mut self, ms: u32) {
		reliable_sleep(Duration::from_millis(u64::from(ms)));
	}
}

impl<'a, B: ?Sized + Bus> Bus for &'a mut B {
	fn read_block(&mut self, address: u8, block: &mut Block) -> io::Result<()> {
		B::read_block(*self, address, block)
	}
	fn write_block(&mut self, address: u8, block: &Block) -> io::Result<()> {
		B::write_block(*self, address, block)
	}
	fn transmit(&mut self, data: &[u8]) -> io::Result<()> {
		B::transmit(*self, data)
	}
	fn receive(&mut self, data: &mut [u8]) -> io::Result<()> {
		B::receive(*self, data)
	}
	fn probe(&mut self) -> io::Result<()> {
		B::probe(*self)
	}
	fn delay_ms(&mut self, ms: u32) {
		B::delay_ms(*self, ms)
	}
}

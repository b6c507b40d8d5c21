use nt3h_i2c::Nt3h;
use nt3h_i2c::bus::BLOCK_SIZE;
use nt3h_i2c::nt3h::CapabilityContainer;
use nt3h_i2c::sim::{
	Event,
	SimulatedDevice,
};
use proptest::prelude::*;

const FILL: u8 = 0x5A;

fn filled_device() -> Nt3h<SimulatedDevice> {
	let mut sim = SimulatedDevice::blank();
	for address in 0..=0xFFu8 {
		sim.set_block(address, [FILL; BLOCK_SIZE]);
	}
	Nt3h::new(sim)
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
	(0..len).map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed)).collect()
}

// flattened memory content starting at block `address`
fn memory(dev: &Nt3h<SimulatedDevice>, address: u8, len: usize) -> Vec<u8> {
	let image = dev.bus().unwrap().image();
	let start = address as usize * BLOCK_SIZE;
	image[start..start + len].to_vec()
}

#[test]
fn write_then_read_round_trip() {
	let lengths = [1, BLOCK_SIZE - 1, BLOCK_SIZE, BLOCK_SIZE + 1, 3 * BLOCK_SIZE];
	let offsets = [0, BLOCK_SIZE - 1];

	for &len in lengths.iter() {
		for &offset in offsets.iter() {
			let mut dev = filled_device();
			let data = pattern(len, offset as u8);
			dev.write_bytes(0x08, offset, &data).unwrap();

			let mut back = vec![0u8; len];
			dev.read_bytes(0x08, offset, &mut back).unwrap();
			assert_eq!(back, data, "len {} offset {}", len, offset);
		}
	}
}

#[test]
fn erase_then_read_is_zero() {
	let mut dev = filled_device();
	dev.erase_bytes(0x20, 7, 40).unwrap();

	let mut back = vec![0xffu8; 40];
	dev.read_bytes(0x20, 7, &mut back).unwrap();
	assert_eq!(back, vec![0u8; 40]);
}

#[test]
fn neighbours_are_preserved() {
	let mut dev = filled_device();
	dev.write_bytes(0x10, 5, &[1, 2, 3]).unwrap();
	dev.erase_bytes(0x11, 14, 4).unwrap();

	let mem = memory(&dev, 0x10, 3 * BLOCK_SIZE);
	assert_eq!(mem[4], FILL);
	assert_eq!(&mem[5..8], &[1, 2, 3]);
	assert_eq!(mem[8], FILL);
	// block 0x11 bytes 14, 15 and block 0x12 bytes 0, 1
	assert_eq!(mem[29], FILL);
	assert_eq!(&mem[30..34], &[0, 0, 0, 0]);
	assert_eq!(mem[34], FILL);
}

#[test]
fn straddling_write_scenario() {
	let mut dev = filled_device();
	let data = pattern(20, 1);
	dev.write_bytes(0x00, 10, &data).unwrap();

	let events = dev.bus_mut().unwrap().take_events();
	let reads: Vec<&Event> = events.iter().filter(|e| matches!(e, Event::ReadBlock(_))).collect();
	let writes: Vec<&Event> = events.iter().filter(|e| matches!(e, Event::WriteBlock(_))).collect();
	assert_eq!(reads, vec![&Event::ReadBlock(0), &Event::ReadBlock(1), &Event::ReadBlock(2)]);
	assert_eq!(writes, vec![&Event::WriteBlock(0), &Event::WriteBlock(1), &Event::WriteBlock(2)]);
	// every read happens before the first write
	let first_write = events.iter().position(|e| matches!(e, Event::WriteBlock(_))).unwrap();
	assert!(events[first_write..].iter().all(|e| !matches!(e, Event::ReadBlock(_))));

	let mem = memory(&dev, 0, 3 * BLOCK_SIZE);
	assert_eq!(&mem[..10], &[FILL; 10]);
	assert_eq!(&mem[10..30], &data[..]);
	assert_eq!(&mem[30..], &[FILL; 18][..]);
}

#[test]
fn config_register_merge() {
	let mut dev = Nt3h::new(SimulatedDevice::new());
	for reg in 0..8u8 {
		let old = dev.read_config(reg).unwrap();
		dev.write_config(reg, 0x0F, 0x05).unwrap();
		assert_eq!(dev.read_config(reg).unwrap(), (old & 0x0F) | 0x05);
	}
}

#[test]
fn init_bootstraps_capability_container() {
	let mut dev = Nt3h::new(SimulatedDevice::blank());
	dev.init().unwrap();

	let cc = dev.read_capability_container().unwrap();
	assert_eq!(cc, CapabilityContainer { magic_number: 0xE1, version: 0x10, mlen: 0x6D, access_control: 0x00 });
	// the rest of block 0 is untouched
	assert_eq!(&dev.bus().unwrap().block(0)[..12], &[0u8; 12]);
}

#[test]
fn settle_delay_only_outside_sram() {
	let mut dev = filled_device();
	dev.write_bytes(0xFA, 0, &[1; 4]).unwrap();
	assert!(dev.bus().unwrap().delays().is_empty());

	dev.bus_mut().unwrap().take_events();
	dev.write_bytes(0x30, 0, &[1; 16]).unwrap();
	assert_eq!(dev.bus().unwrap().delays(), vec![4]);

	dev.bus_mut().unwrap().take_events();
	dev.write_bytes(0x30, 0, &[1; 32]).unwrap();
	// 32 bytes at offset 0 touch three blocks
	assert_eq!(dev.bus().unwrap().delays(), vec![4, 4, 4]);
}

proptest! {
	#[test]
	fn round_trip_anywhere(address in 0u8..0xC0, offset in 0usize..64, data in proptest::collection::vec(any::<u8>(), 1..100)) {
		let mut dev = filled_device();
		dev.write_bytes(address, offset, &data).unwrap();

		let mut back = vec![0u8; data.len()];
		dev.read_bytes(address, offset, &mut back).unwrap();
		prop_assert_eq!(&back, &data);

		// bytes right before and after the range keep their value
		let start = address as usize * BLOCK_SIZE + offset;
		let image = dev.bus().unwrap().image();
		if start > 0 {
			prop_assert_eq!(image[start - 1], FILL);
		}
		prop_assert_eq!(image[start + data.len()], FILL);
	}
}

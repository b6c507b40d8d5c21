#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate nt3h_i2c;
use nt3h_i2c::*;

use std::io::{
	self,
	Write,
};
use std::process::exit;
use std::time::Duration;

use nt3h_i2c::bus::{
	Bus,
	Span,
};
use nt3h_i2c::nt3h::{
	CapabilityContainer,
	HexDump,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str, parse: fn(&str) -> AResult<T>) -> AResult<T> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	parse(param).map_err(|e| {
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn read_memory<B: Bus>(dev: &mut Nt3h<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_param(sub_m, "ADDRESS", args::parse_u8)?;
	let offset = get_param(sub_m, "OFFSET", args::parse_usize)?;
	let length = get_param(sub_m, "LENGTH", args::parse_usize)?;
	ensure!(Span::new(address, offset, length).fits(), "{} bytes at block 0x{:02x} + {} exceed the block address space", length, address, offset);

	let mut data = vec![0u8; length];
	dev.read_bytes(address, offset, &mut data)?;
	if sub_m.is_present("raw") {
		io::stdout().write_all(&data)?;
	} else {
		println!("{}", args::format_hex_bytes(&data));
	}
	Ok(())
}

fn write_memory<B: Bus>(dev: &mut Nt3h<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_param(sub_m, "ADDRESS", args::parse_u8)?;
	let offset = get_param(sub_m, "OFFSET", args::parse_usize)?;
	let data = get_param(sub_m, "DATA", args::parse_hex_bytes)?;

	dev.write_bytes(address, offset, &data)?;
	info!("wrote {} bytes at block 0x{:02x} + {}", data.len(), address, offset);
	Ok(())
}

fn erase_memory<B: Bus>(dev: &mut Nt3h<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_param(sub_m, "ADDRESS", args::parse_u8)?;
	let offset = get_param(sub_m, "OFFSET", args::parse_usize)?;
	let length = get_param(sub_m, "LENGTH", args::parse_usize)?;

	dev.erase_bytes(address, offset, length)?;
	info!("erased {} bytes at block 0x{:02x} + {}", length, address, offset);
	Ok(())
}

fn dump_memory<B: Bus>(dev: &mut Nt3h<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_param(sub_m, "ADDRESS", args::parse_u8)?;
	let count = match sub_m.value_of("COUNT") {
		Some(_) => get_param(sub_m, "COUNT", args::parse_usize)?,
		None => 1,
	};

	let blocks = dev.read_blocks(address, count)?;
	println!("{}", HexDump { address, blocks: &blocks });
	Ok(())
}

fn write_cc<B: Bus>(dev: &mut Nt3h<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let bytes = get_param(sub_m, "CC", args::parse_hex_bytes)?;
	ensure!(bytes.len() == 4, "Capability Container has 4 bytes, got {}", bytes.len());
	let cc = CapabilityContainer::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
	dev.write_capability_container(cc)?;
	info!("programmed Capability Container {:?}", cc);
	Ok(())
}

fn run<B: Bus>(dev: &mut Nt3h<B>, matches: &clap::ArgMatches) -> AResult<()> {
	match matches.subcommand() {
		("check", _) => {
			dev.check()?;
			println!("device responding");
			Ok(())
		},
		("init", _) => {
			let cc = dev.init()?;
			println!("CC: {:?}", cc);
			Ok(())
		},
		("info", _) => {
			println!("{}", dev.read_device_info()?);
			Ok(())
		},
		("dump", Some(sub_m)) => dump_memory(dev, sub_m),
		("read", Some(sub_m)) => read_memory(dev, sub_m),
		("write", Some(sub_m)) => write_memory(dev, sub_m),
		("erase", Some(sub_m)) => erase_memory(dev, sub_m),
		("config", Some(sub_m)) => {
			match sub_m.value_of("REGISTER") {
				Some(_) => {
					let reg = get_param(sub_m, "REGISTER", args::parse_u8)?;
					println!("0x{:02X}", dev.read_config(reg)?);
				},
				None => println!("{}", dev.read_config_registers()?),
			}
			Ok(())
		},
		("set_config", Some(sub_m)) => {
			let reg = get_param(sub_m, "REGISTER", args::parse_u8)?;
			let mask = get_param(sub_m, "MASK", args::parse_u8)?;
			let value = get_param(sub_m, "VALUE", args::parse_u8)?;
			dev.write_config(reg, mask, value)
				.map_err(|e| format_err!("Unable to write config register {}: {}", reg, e))
		},
		("session", Some(sub_m)) => {
			match sub_m.value_of("REGISTER") {
				Some(_) => {
					let reg = get_param(sub_m, "REGISTER", args::parse_u8)?;
					println!("0x{:02X}", dev.read_register(reg)?);
				},
				None => println!("{}", dev.read_session_registers()?),
			}
			Ok(())
		},
		("set_session", Some(sub_m)) => {
			let reg = get_param(sub_m, "REGISTER", args::parse_u8)?;
			let mask = get_param(sub_m, "MASK", args::parse_u8)?;
			let value = get_param(sub_m, "VALUE", args::parse_u8)?;
			dev.write_register(reg, mask, value)
				.map_err(|e| format_err!("Unable to write session register {}: {}", reg, e))
		},
		("field", _) => {
			if dev.read_field_present()? {
				println!("RF field present");
			} else {
				println!("no RF field");
			}
			Ok(())
		},
		("set_address", Some(sub_m)) => {
			let address = get_param(sub_m, "ADDRESS", args::parse_u8)?;
			dev.write_bus_address(address)?;
			warn!("device will answer on address 0x{:02x} after power cycle", address);
			Ok(())
		},
		("write_cc", Some(sub_m)) => write_cc(dev, sub_m),
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg bus: -b --bus +takes_value "I2C bus device (default /dev/i2c-1)")
		(@arg address: -a --address +takes_value "7-bit I2C address of the device (default 0x55)")
		(@arg timeout: -t --timeout +takes_value "bus timeout in ms (default 1000)")
		(@arg simulate: --simulate +takes_value "use a simulated device backed by this memory image file")
		(@subcommand check =>
			(about: "check the device responds")
		)
		(@subcommand init =>
			(about: "initialize device: program Capability Container if empty")
		)
		(@subcommand info =>
			(about: "show address, serial number, lock bytes and Capability Container")
		)
		(@subcommand dump =>
			(about: "hexdump memory blocks")
			(@arg ADDRESS: +required "first block")
			(@arg COUNT: "number of blocks (default 1)")
		)
		(@subcommand read =>
			(about: "read bytes")
			(@arg raw: -r --raw "write binary data to stdout")
			(@arg ADDRESS: +required "block address")
			(@arg OFFSET: +required "byte offset from block start")
			(@arg LENGTH: +required "number of bytes")
		)
		(@subcommand write =>
			(about: "write bytes")
			(@arg ADDRESS: +required "block address")
			(@arg OFFSET: +required "byte offset from block start")
			(@arg DATA: +required "data as hex digits")
		)
		(@subcommand erase =>
			(about: "set bytes to zero")
			(@arg ADDRESS: +required "block address")
			(@arg OFFSET: +required "byte offset from block start")
			(@arg LENGTH: +required "number of bytes")
		)
		(@subcommand config =>
			(about: "show configuration registers")
			(@arg REGISTER: "single register to show")
		)
		(@subcommand set_config =>
			(about: "write configuration register: (old & MASK) | VALUE")
			(@arg REGISTER: +required "register")
			(@arg MASK: +required "bits to keep")
			(@arg VALUE: +required "bits to set")
		)
		(@subcommand session =>
			(about: "show session registers")
			(@arg REGISTER: "single register to show")
		)
		(@subcommand set_session =>
			(about: "write session register (only bits in MASK change)")
			(@arg REGISTER: +required "register")
			(@arg MASK: +required "bits to change")
			(@arg VALUE: +required "new value")
		)
		(@subcommand field =>
			(about: "check whether an RF field is present")
		)
		(@subcommand set_address =>
			(about: "program I2C address (active after power cycle)")
			(@arg ADDRESS: +required "new 7-bit address")
		)
		(@subcommand write_cc =>
			(about: "program Capability Container")
			(@arg CC: +required "4 bytes as hex digits, e.g. e1106d00")
		)
	).get_matches();

	if let Some(image) = matches.value_of("simulate") {
		let mut dev = Nt3h::new(sim::SimulatedDevice::load(image)?);
		let res = run(&mut dev, &matches);
		if let Some(sim) = dev.deinit() {
			sim.save(image)?;
		}
		return res;
	}

	let mut config = linux::I2cConfig::default();
	if let Some(bus) = matches.value_of("bus") {
		config.path = bus.into();
	}
	if matches.is_present("address") {
		config.address = get_param(&matches, "address", args::parse_u8)?;
	}
	if matches.is_present("timeout") {
		let ms = get_param(&matches, "timeout", args::parse_usize)?;
		config.timeout = Duration::from_millis(ms as u64);
	}

	let mut dev = Nt3h::new(linux::open_i2c(&config)?);
	run(&mut dev, &matches)
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}

mod i2c;

pub use self::i2c::{
	I2cConfig,
	I2cDevice,
	open_i2c,
};

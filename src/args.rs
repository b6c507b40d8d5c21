/// Parsing of command line values: numbers as decimal or `0x` hex, byte
/// strings as hex digits.

use std::num::ParseIntError;

pub fn parse_number<T>(s: &str, from_str_radix: fn(&str, u32) -> Result<T, ParseIntError>) -> crate::AResult<T> {
	let s = s.trim();
	with_context!(("invalid number {:?}", s), {
		if s.starts_with("0x") || s.starts_with("0X") {
			Ok(from_str_radix(&s[2..], 16)?)
		} else {
			Ok(from_str_radix(s, 10)?)
		}
	})
}

pub fn parse_u8(s: &str) -> crate::AResult<u8> {
	parse_number(s, u8::from_str_radix)
}

pub fn parse_usize(s: &str) -> crate::AResult<usize> {
	parse_number(s, usize::from_str_radix)
}

/// Hex digits, optionally separated by whitespace or ':' ("de ad:be ef").
pub fn parse_hex_bytes(s: &str) -> crate::AResult<Vec<u8>> {
	let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace() && *b != b':').collect();
	ensure!(!digits.is_empty(), "no data");
	ensure!(digits.len() % 2 == 0, "odd number of hex digits in {:?}", s);

	let mut result = Vec::with_capacity(digits.len() / 2);
	for pair in digits.chunks(2) {
		ensure!(pair.iter().all(u8::is_ascii_hexdigit), "invalid hex byte {:?}", String::from_utf8_lossy(pair));
		let pair = std::str::from_utf8(pair)?;
		let b = with_context!(("invalid hex byte {:?}", pair),
			Ok(u8::from_str_radix(pair, 16)?)
		)?;
		result.push(b);
	}
	Ok(result)
}

pub fn format_hex_bytes(data: &[u8]) -> String {
	let mut s = String::with_capacity(data.len() * 3);
	for (i, b) in data.iter().enumerate() {
		if i > 0 { s.push(' '); }
		s.push_str(&format!("{:02x}", b));
	}
	s
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numbers() {
		assert_eq!(parse_u8("0x3A").unwrap(), 0x3A);
		assert_eq!(parse_u8("58").unwrap(), 58);
		assert_eq!(parse_usize(" 0x100 ").unwrap(), 256);
		assert!(parse_u8("0x100").is_err());
		assert!(parse_u8("abc").is_err());
	}

	#[test]
	fn hex_bytes() {
		assert_eq!(parse_hex_bytes("deadBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
		assert_eq!(parse_hex_bytes("e1:10 6d:00").unwrap(), vec![0xe1, 0x10, 0x6d, 0x00]);
		assert!(parse_hex_bytes("abc").is_err());
		assert!(parse_hex_bytes("zz").is_err());
		assert!(parse_hex_bytes("+f").is_err());
		assert!(parse_hex_bytes("00-1").is_err());
		assert!(parse_hex_bytes("  ").is_err());
		assert_eq!(format_hex_bytes(&[0xe1, 0x10, 0x6d]), "e1 10 6d");
	}
}

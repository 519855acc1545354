//! Parsing helpers for command-line and configuration values.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human readable size such as `"1GB"` or `"512MiB"` into bytes.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}

/// Returns true for a `0x`-prefixed 20-byte hex address (case-insensitive).
pub fn is_hex_address(value: &str) -> bool {
	value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.is_some_and(|hex_part| hex_part.len() == 40 && hex::decode(hex_part).is_ok())
}

/// Lowercases an address and guarantees the `0x` prefix.
pub fn normalize_address(value: &str) -> String {
	let trimmed = value.trim();
	let body = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.unwrap_or(trimmed);
	format!("0x{}", body.to_lowercase())
}

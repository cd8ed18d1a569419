// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Fixed little-endian layouts of the struct-shaped host types.

mod date;
mod guid;
mod numeric;
mod timestamp;

pub use date::DateStruct;
pub use guid::GuidStruct;
pub use numeric::NumericStruct;
pub use timestamp::TimestampStruct;

use crate::{Error, Result};

/// Host booleans are single bytes; anything other than `0` and ASCII `'0'` is true.
#[inline]
pub fn is_bit_true(byte: u8) -> bool {
	byte != 0 && byte != b'0'
}

#[inline]
pub(crate) fn expect_len(bytes: &[u8], size: usize, what: &str) -> Result<()> {
	if bytes.len() < size {
		return Err(Error::malformed(format!("{what} needs {size} bytes, got {}", bytes.len())));
	}
	Ok(())
}

#[inline]
pub(crate) fn read_u16(bytes: &[u8], at: usize) -> u16 {
	u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
	u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

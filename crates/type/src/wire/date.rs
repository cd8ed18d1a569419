// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::{expect_len, read_u16};
use crate::{Error, Result, value::Date};

/// `{ i16 year, u16 month, u16 day }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateStruct {
	pub year: i16,
	pub month: u16,
	pub day: u16,
}

impl DateStruct {
	pub const SIZE: usize = 6;

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		expect_len(bytes, Self::SIZE, "date")?;
		Ok(Self {
			year: read_u16(bytes, 0) as i16,
			month: read_u16(bytes, 2),
			day: read_u16(bytes, 4),
		})
	}

	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0u8; Self::SIZE];
		out[0..2].copy_from_slice(&self.year.to_le_bytes());
		out[2..4].copy_from_slice(&self.month.to_le_bytes());
		out[4..6].copy_from_slice(&self.day.to_le_bytes());
		out
	}

	pub fn to_date(&self) -> Result<Date> {
		Date::new(self.year as i32, self.month as u32, self.day as u32).ok_or_else(|| {
			Error::malformed(format!("invalid date {}-{:02}-{:02}", self.year, self.month, self.day))
		})
	}

	pub fn from_date(date: &Date) -> Result<Self> {
		let year = i16::try_from(date.year())
			.map_err(|_| Error::unsupported(format!("date {date} is outside the host's year range")))?;
		Ok(Self {
			year,
			month: date.month() as u16,
			day: date.day() as u16,
		})
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_layout_is_little_endian() {
		let s = DateStruct {
			year: 2024,
			month: 2,
			day: 29,
		};
		assert_eq!(s.to_bytes(), [0xe8, 0x07, 0x02, 0x00, 0x1d, 0x00]);
		assert_eq!(DateStruct::from_bytes(&s.to_bytes()).unwrap(), s);
	}

	#[test]
	fn test_invalid_calendar_date_is_malformed() {
		let s = DateStruct {
			year: 2023,
			month: 2,
			day: 29,
		};
		assert!(s.to_date().is_err());
	}

	#[test]
	fn test_short_buffer() {
		assert!(DateStruct::from_bytes(&[0, 0, 0]).is_err());
	}
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::{expect_len, read_u16, read_u32};
use crate::{
	Error, Result,
	value::{Date, DateTime},
};

/// `{ i16 year, u16 month, u16 day, u16 hour, u16 minute, u16 second, u32 fraction }`, fraction in
/// nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampStruct {
	pub year: i16,
	pub month: u16,
	pub day: u16,
	pub hour: u16,
	pub minute: u16,
	pub second: u16,
	pub fraction: u32,
}

impl TimestampStruct {
	pub const SIZE: usize = 16;

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		expect_len(bytes, Self::SIZE, "timestamp")?;
		Ok(Self {
			year: read_u16(bytes, 0) as i16,
			month: read_u16(bytes, 2),
			day: read_u16(bytes, 4),
			hour: read_u16(bytes, 6),
			minute: read_u16(bytes, 8),
			second: read_u16(bytes, 10),
			fraction: read_u32(bytes, 12),
		})
	}

	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0u8; Self::SIZE];
		out[0..2].copy_from_slice(&self.year.to_le_bytes());
		out[2..4].copy_from_slice(&self.month.to_le_bytes());
		out[4..6].copy_from_slice(&self.day.to_le_bytes());
		out[6..8].copy_from_slice(&self.hour.to_le_bytes());
		out[8..10].copy_from_slice(&self.minute.to_le_bytes());
		out[10..12].copy_from_slice(&self.second.to_le_bytes());
		out[12..16].copy_from_slice(&self.fraction.to_le_bytes());
		out
	}

	/// Sub-microsecond digits of `fraction` are truncated.
	pub fn to_datetime(&self) -> Result<DateTime> {
		let date = Date::new(self.year as i32, self.month as u32, self.day as u32).ok_or_else(|| {
			Error::malformed(format!("invalid date {}-{:02}-{:02}", self.year, self.month, self.day))
		})?;
		DateTime::from_parts(date, self.hour as u32, self.minute as u32, self.second as u32, self.fraction / 1_000)
			.ok_or_else(|| {
				Error::malformed(format!(
					"invalid time {:02}:{:02}:{:02}.{:09}",
					self.hour, self.minute, self.second, self.fraction
				))
			})
	}

	pub fn from_datetime(datetime: &DateTime) -> Result<Self> {
		let date = datetime.date();
		let year = i16::try_from(date.year()).map_err(|_| {
			Error::unsupported(format!("timestamp {datetime} is outside the host's year range"))
		})?;
		Ok(Self {
			year,
			month: date.month() as u16,
			day: date.day() as u16,
			hour: datetime.hour() as u16,
			minute: datetime.minute() as u16,
			second: datetime.second() as u16,
			fraction: datetime.microsecond() * 1_000,
		})
	}
}

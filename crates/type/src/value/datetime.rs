// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::Date;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// A date and time of day at microsecond resolution, stored as microseconds since
/// 1970-01-01T00:00:00.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateTime {
	micros_since_epoch: i64,
}

impl DateTime {
	pub fn from_parts(date: Date, hour: u32, minute: u32, second: u32, microsecond: u32) -> Option<Self> {
		if hour > 23 || minute > 59 || second > 59 || microsecond >= MICROS_PER_SECOND as u32 {
			return None;
		}
		let time_of_day = (hour as i64 * 3600 + minute as i64 * 60 + second as i64) * MICROS_PER_SECOND
			+ microsecond as i64;
		Some(Self {
			micros_since_epoch: date.to_days_since_epoch() as i64 * MICROS_PER_DAY + time_of_day,
		})
	}

	pub fn from_micros_since_epoch(micros: i64) -> Self {
		Self {
			micros_since_epoch: micros,
		}
	}

	pub fn to_micros_since_epoch(&self) -> i64 {
		self.micros_since_epoch
	}

	pub fn date(&self) -> Date {
		Date::from_days_since_epoch(self.micros_since_epoch.div_euclid(MICROS_PER_DAY) as i32)
	}

	fn time_of_day(&self) -> i64 {
		self.micros_since_epoch.rem_euclid(MICROS_PER_DAY)
	}

	pub fn hour(&self) -> u32 {
		(self.time_of_day() / (3600 * MICROS_PER_SECOND)) as u32
	}

	pub fn minute(&self) -> u32 {
		(self.time_of_day() / (60 * MICROS_PER_SECOND) % 60) as u32
	}

	pub fn second(&self) -> u32 {
		(self.time_of_day() / MICROS_PER_SECOND % 60) as u32
	}

	pub fn microsecond(&self) -> u32 {
		(self.time_of_day() % MICROS_PER_SECOND) as u32
	}
}

impl Display for DateTime {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}T{:02}:{:02}:{:02}", self.date(), self.hour(), self.minute(), self.second())?;
		let micros = self.microsecond();
		if micros != 0 {
			write!(f, ".{:06}", micros)?;
		}
		Ok(())
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_parts() {
		let date = Date::new(2021, 3, 14).unwrap();
		let dt = DateTime::from_parts(date, 15, 9, 26, 535_897).unwrap();
		assert_eq!(dt.date(), date);
		assert_eq!((dt.hour(), dt.minute(), dt.second(), dt.microsecond()), (15, 9, 26, 535_897));
		assert_eq!(dt.to_string(), "2021-03-14T15:09:26.535897");
	}

	#[test]
	fn test_before_epoch() {
		let date = Date::new(1969, 12, 31).unwrap();
		let dt = DateTime::from_parts(date, 23, 0, 0, 0).unwrap();
		assert!(dt.to_micros_since_epoch() < 0);
		assert_eq!(dt.date(), date);
		assert_eq!(dt.hour(), 23);
	}

	#[test]
	fn test_rejects_out_of_range_time() {
		let date = Date::new(2021, 3, 14).unwrap();
		assert!(DateTime::from_parts(date, 24, 0, 0, 0).is_none());
		assert!(DateTime::from_parts(date, 0, 60, 0, 0).is_none());
		assert!(DateTime::from_parts(date, 0, 0, 0, 1_000_000).is_none());
	}
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use uuid::Uuid;

use super::{expect_len, read_u16, read_u32};
use crate::Result;

/// `{ u32 data1, u16 data2, u16 data3, [u8; 8] data4 }`, the mixed-endian GUID layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct GuidStruct {
	pub data1: u32,
	pub data2: u16,
	pub data3: u16,
	pub data4: [u8; 8],
}

impl GuidStruct {
	pub const SIZE: usize = 16;

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		expect_len(bytes, Self::SIZE, "guid")?;
		let mut data4 = [0u8; 8];
		data4.copy_from_slice(&bytes[8..16]);
		Ok(Self {
			data1: read_u32(bytes, 0),
			data2: read_u16(bytes, 4),
			data3: read_u16(bytes, 6),
			data4,
		})
	}

	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0u8; Self::SIZE];
		out[0..4].copy_from_slice(&self.data1.to_le_bytes());
		out[4..6].copy_from_slice(&self.data2.to_le_bytes());
		out[6..8].copy_from_slice(&self.data3.to_le_bytes());
		out[8..16].copy_from_slice(&self.data4);
		out
	}

	pub fn to_uuid(&self) -> Uuid {
		Uuid::from_fields(self.data1, self.data2, self.data3, &self.data4)
	}

	pub fn from_uuid(uuid: &Uuid) -> Self {
		let (data1, data2, data3, data4) = uuid.as_fields();
		Self {
			data1,
			data2,
			data3,
			data4: *data4,
		}
	}
}

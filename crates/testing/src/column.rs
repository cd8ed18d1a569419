// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host-side column buffers, laid out the way the host passes them to `Execute`.

use bytemuck::Pod;
use langbridge_abi::{constants::SQL_NULL_DATA, data::ColumnBuffer};

/// One slot per row; NULL rows keep a zeroed slot.
pub fn fixed_column<T: Pod>(values: &[Option<T>]) -> ColumnBuffer {
	let width = size_of::<T>();
	let mut buffer = ColumnBuffer::with_capacity(width * values.len(), values.len());
	for value in values {
		match value {
			Some(v) => {
				buffer.data.extend_from_slice(bytemuck::bytes_of(v));
				buffer.indicators.push(width as i32);
			}
			None => {
				buffer.data.extend(std::iter::repeat_n(0u8, width));
				buffer.indicators.push(SQL_NULL_DATA);
			}
		}
	}
	buffer
}

/// Fixed-width rows already encoded as wire structs.
pub fn struct_column(width: usize, values: &[Option<Vec<u8>>]) -> ColumnBuffer {
	let mut buffer = ColumnBuffer::with_capacity(width * values.len(), values.len());
	for value in values {
		match value {
			Some(bytes) => {
				assert_eq!(bytes.len(), width);
				buffer.data.extend_from_slice(bytes);
				buffer.indicators.push(width as i32);
			}
			None => {
				buffer.data.extend(std::iter::repeat_n(0u8, width));
				buffer.indicators.push(SQL_NULL_DATA);
			}
		}
	}
	buffer
}

pub fn int32_column(values: &[Option<i32>]) -> ColumnBuffer {
	fixed_column(values)
}

pub fn int64_column(values: &[Option<i64>]) -> ColumnBuffer {
	fixed_column(values)
}

pub fn float64_column(values: &[Option<f64>]) -> ColumnBuffer {
	fixed_column(values)
}

pub fn bool_column(values: &[Option<bool>]) -> ColumnBuffer {
	let bytes: Vec<Option<u8>> = values.iter().map(|v| v.map(u8::from)).collect();
	fixed_column(&bytes)
}

/// Packed variable-length rows; NULL rows take no space.
pub fn binary_column(values: &[Option<&[u8]>]) -> ColumnBuffer {
	let mut buffer = ColumnBuffer::with_capacity(values.iter().flatten().map(|v| v.len()).sum(), values.len());
	for value in values {
		match value {
			Some(bytes) => {
				buffer.data.extend_from_slice(bytes);
				buffer.indicators.push(bytes.len() as i32);
			}
			None => buffer.indicators.push(SQL_NULL_DATA),
		}
	}
	buffer
}

pub fn string_column(values: &[Option<&str>]) -> ColumnBuffer {
	let bytes: Vec<Option<&[u8]>> = values.iter().map(|v| v.map(str::as_bytes)).collect();
	binary_column(&bytes)
}

pub fn wide_string_column(values: &[Option<&str>]) -> ColumnBuffer {
	let encoded: Vec<Option<Vec<u8>>> =
		values.iter().map(|v| v.map(|s| s.encode_utf16().flat_map(u16::to_le_bytes).collect())).collect();
	let bytes: Vec<Option<&[u8]>> = encoded.iter().map(|v| v.as_deref()).collect();
	binary_column(&bytes)
}

/// Reads back rows of a fixed-width column.
pub fn read_fixed<T: Pod>(buffer: &ColumnBuffer) -> Vec<Option<T>> {
	let width = size_of::<T>();
	buffer.indicators
		.iter()
		.enumerate()
		.map(|(row, indicator)| {
			(*indicator != SQL_NULL_DATA)
				.then(|| bytemuck::pod_read_unaligned(&buffer.data[row * width..(row + 1) * width]))
		})
		.collect()
}

/// Reads back rows of a packed variable-length column.
pub fn read_binary(buffer: &ColumnBuffer) -> Vec<Option<Vec<u8>>> {
	let mut offset = 0usize;
	buffer.indicators
		.iter()
		.map(|indicator| {
			if *indicator == SQL_NULL_DATA {
				return None;
			}
			let len = *indicator as usize;
			let row = buffer.data[offset..offset + len].to_vec();
			offset += len;
			Some(row)
		})
		.collect()
}

pub fn read_strings(buffer: &ColumnBuffer) -> Vec<Option<String>> {
	read_binary(buffer).into_iter().map(|row| row.map(|b| String::from_utf8_lossy(&b).into_owned())).collect()
}

pub fn read_wide_strings(buffer: &ColumnBuffer) -> Vec<Option<String>> {
	read_binary(buffer)
		.into_iter()
		.map(|row| {
			row.map(|b| {
				let units: Vec<u16> = b.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
				String::from_utf16_lossy(&units)
			})
		})
		.collect()
}

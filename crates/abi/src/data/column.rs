// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{borrow::Cow, ffi::c_void, slice};

use bytemuck::Pod;
use langbridge_type::{Error, Result, TypeTag};

use crate::constants::SQL_NULL_DATA;

/// Borrowed view of one host column: the value buffer and its parallel indicator array.
///
/// Fixed-width values are laid out at a stride of the type's width. Variable-length values are
/// packed back to back; a row's offset is the sum of the previous non-NULL rows' indicators.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSlice<'a> {
	pub data: &'a [u8],
	pub indicators: Option<&'a [i32]>,
	pub row_count: usize,
}

impl<'a> ColumnSlice<'a> {
	pub fn new(data: &'a [u8], indicators: Option<&'a [i32]>, row_count: usize) -> Self {
		Self {
			data,
			indicators,
			row_count,
		}
	}

	/// Builds a view over host memory.
	///
	/// The data length is derived from `tag`: `row_count * width` for fixed types, the sum of the
	/// non-NULL indicators for variable ones.
	///
	/// # Safety
	///
	/// `data` must be valid for the derived length and `indicators`, when non-null, for
	/// `row_count` elements, both for the lifetime `'a`.
	pub unsafe fn from_raw(
		tag: TypeTag,
		data: *const c_void,
		indicators: *const i32,
		row_count: usize,
	) -> Result<Self> {
		let indicators = if indicators.is_null() || row_count == 0 {
			None
		} else {
			Some(unsafe { slice::from_raw_parts(indicators, row_count) })
		};

		let len = match tag.fixed_width() {
			Some(width) => width * row_count,
			None => match indicators {
				Some(ind) => variable_length(ind)?,
				None if row_count == 0 => 0,
				None => {
					return Err(Error::malformed(format!(
						"{tag} column of {row_count} rows has no indicator array"
					)));
				}
			},
		};

		let data = if len == 0 {
			&[][..]
		} else if data.is_null() {
			return Err(Error::malformed(format!("{tag} column has a null data pointer")));
		} else {
			unsafe { slice::from_raw_parts(data as *const u8, len) }
		};

		Ok(Self {
			data,
			indicators,
			row_count,
		})
	}

	/// Indicator of `row`; rows of a column without indicators are implicitly present.
	#[inline]
	pub fn indicator(&self, row: usize) -> Option<i32> {
		self.indicators.map(|ind| ind[row])
	}

	#[inline]
	pub fn is_null(&self, row: usize) -> bool {
		self.indicator(row) == Some(SQL_NULL_DATA)
	}

	pub fn has_nulls(&self) -> bool {
		self.indicators.is_some_and(|ind| ind.iter().any(|&i| i == SQL_NULL_DATA))
	}

	/// Bytes of fixed-width row `row`.
	pub fn fixed(&self, row: usize, width: usize) -> Result<&'a [u8]> {
		let start = row * width;
		self.data.get(start..start + width).ok_or_else(|| {
			Error::malformed(format!("row {row} overruns a {} byte buffer", self.data.len()))
		})
	}

	/// The value buffer as `row_count` values of `T`. Borrows when the host buffer is suitably
	/// aligned, copies otherwise.
	pub fn typed<T: Pod>(&self) -> Result<Cow<'a, [T]>> {
		let len = self.row_count * size_of::<T>();
		let bytes = self.data.get(..len).ok_or_else(|| {
			Error::malformed(format!(
				"{} rows of {} bytes overrun a {} byte buffer",
				self.row_count,
				size_of::<T>(),
				self.data.len()
			))
		})?;
		Ok(match bytemuck::try_cast_slice(bytes) {
			Ok(values) => Cow::Borrowed(values),
			Err(_) => Cow::Owned(bytemuck::pod_collect_to_vec(bytes)),
		})
	}

	/// Walks variable-length rows, yielding `None` for NULL rows.
	pub fn variable_rows(&self) -> VariableRows<'a> {
		VariableRows {
			slice: *self,
			row: 0,
			offset: 0,
		}
	}
}

fn variable_length(indicators: &[i32]) -> Result<usize> {
	let mut total = 0usize;
	for (row, &ind) in indicators.iter().enumerate() {
		match ind {
			SQL_NULL_DATA => {}
			len if len >= 0 => total += len as usize,
			other => return Err(Error::malformed(format!("row {row} has invalid indicator {other}"))),
		}
	}
	Ok(total)
}

pub struct VariableRows<'a> {
	slice: ColumnSlice<'a>,
	row: usize,
	offset: usize,
}

impl<'a> Iterator for VariableRows<'a> {
	type Item = Result<Option<&'a [u8]>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.row >= self.slice.row_count {
			return None;
		}
		let row = self.row;
		self.row += 1;

		let len = match self.slice.indicator(row) {
			Some(SQL_NULL_DATA) => return Some(Ok(None)),
			Some(len) if len >= 0 => len as usize,
			Some(other) => return Some(Err(Error::malformed(format!("row {row} has invalid indicator {other}")))),
			None => return Some(Err(Error::malformed("variable-length column without indicators"))),
		};

		let start = self.offset;
		self.offset += len;
		Some(self.slice.data.get(start..start + len).map(Some).ok_or_else(|| {
			Error::malformed(format!("row {row} overruns a {} byte buffer", self.slice.data.len()))
		}))
	}
}

/// Owned column data handed back to the host: packed values plus one indicator per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBuffer {
	pub data: Vec<u8>,
	pub indicators: Vec<i32>,
}

impl ColumnBuffer {
	pub fn with_capacity(bytes: usize, rows: usize) -> Self {
		Self {
			data: Vec::with_capacity(bytes),
			indicators: Vec::with_capacity(rows),
		}
	}

	pub fn row_count(&self) -> usize {
		self.indicators.len()
	}

	pub fn as_slice(&self) -> ColumnSlice<'_> {
		ColumnSlice {
			data: &self.data,
			indicators: Some(&self.indicators),
			row_count: self.indicators.len(),
		}
	}

	/// Pointer handed to the host; null for an empty buffer.
	pub fn data_ptr(&self) -> *const c_void {
		if self.data.is_empty() {
			std::ptr::null()
		} else {
			self.data.as_ptr() as *const c_void
		}
	}

	pub fn indicators_ptr(&self) -> *const i32 {
		if self.indicators.is_empty() {
			std::ptr::null()
		} else {
			self.indicators.as_ptr()
		}
	}
}

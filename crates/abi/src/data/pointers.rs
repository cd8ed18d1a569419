// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_void, ptr};

use crate::data::ColumnBuffer;

/// Per-column data and indicator pointer arrays handed out by `GetResults`.
///
/// The pointers borrow from the column buffers they were built from; the owner must rebuild or
/// drop this table whenever those buffers change.
#[derive(Debug, Default)]
pub struct ResultPointers {
	data: Vec<*const c_void>,
	indicators: Vec<*const i32>,
}

// Only addresses are stored; they are dereferenced by the host, never through this type.
unsafe impl Send for ResultPointers {}
unsafe impl Sync for ResultPointers {}

impl ResultPointers {
	pub fn new<'a>(buffers: impl IntoIterator<Item = &'a ColumnBuffer>) -> Self {
		let (data, indicators) = buffers.into_iter().map(|b| (b.data_ptr(), b.indicators_ptr())).unzip();
		Self {
			data,
			indicators,
		}
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Null when there are no columns.
	pub fn data(&self) -> *const *const c_void {
		if self.data.is_empty() { ptr::null() } else { self.data.as_ptr() }
	}

	pub fn indicators(&self) -> *const *const i32 {
		if self.indicators.is_empty() { ptr::null() } else { self.indicators.as_ptr() }
	}
}

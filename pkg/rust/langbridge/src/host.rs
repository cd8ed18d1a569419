// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Reading the host's string and pointer arguments.

use std::{
	ffi::{CStr, c_char},
	slice, str,
};

use langbridge_abi::types::SqlChar;
use langbridge_type::{Error, Result, contract_violation, return_contract_violation};

/// A host string of `len` bytes, or NUL-terminated when `len` is negative. Null is `None`.
///
/// # Safety
///
/// A non-null `ptr` must be valid for `len` bytes, or up to its NUL terminator when `len` is
/// negative, for `'a`.
pub(crate) unsafe fn text<'a>(ptr: *const SqlChar, len: i64) -> Result<Option<&'a str>> {
	if ptr.is_null() {
		return Ok(None);
	}
	let bytes = if len < 0 {
		unsafe { CStr::from_ptr(ptr as *const c_char) }.to_bytes()
	} else {
		unsafe { slice::from_raw_parts(ptr, len as usize) }
	};
	str::from_utf8(bytes).map(Some).map_err(|err| Error::malformed(format!("host string is not UTF-8: {err}")))
}

pub(crate) fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
	value.ok_or_else(|| contract_violation!("{what} must not be null"))
}

/// Writes `value` through an out-pointer.
///
/// # Safety
///
/// A non-null `ptr` must be valid for writes.
pub(crate) unsafe fn put<T>(ptr: *mut T, value: T, what: &str) -> Result<()> {
	if ptr.is_null() {
		return_contract_violation!("{what} out-pointer is null");
	}
	unsafe { ptr.write(value) };
	Ok(())
}

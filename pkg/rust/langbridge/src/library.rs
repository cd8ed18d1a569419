// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! External library calls. They work with or without a running extension.

#![allow(non_snake_case)]

use std::{path::Path, ptr};

use langbridge_abi::{
	constants::{SQL_ERROR, SQL_SUCCESS},
	session::{SessionId, SqlGuid},
	types::{SqlChar, SqlInteger, SqlReturn},
};
use langbridge_library::{LibraryManager, Scope};
use langbridge_type::Result;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
	boundary::run,
	global,
	host::{required, text},
};

/// Message of the last failed library call, NUL-terminated. Lives until the next library call or
/// `Cleanup`.
static LAST_ERROR: Lazy<Mutex<Option<Vec<u8>>>> = Lazy::new(|| Mutex::new(None));

pub(crate) fn clear_error() {
	LAST_ERROR.lock().take();
}

/// Installs `library_file` into `library_install_directory`. On failure the message is handed out
/// through `library_error` and `library_error_length`.
///
/// # Safety
///
/// Every non-null string must be valid for its length; the error out-pointers, when non-null,
/// must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn InstallExternalLibrary(
	setup_session_id: SqlGuid,
	library_name: *const SqlChar,
	library_name_length: SqlInteger,
	library_file: *const SqlChar,
	library_file_length: SqlInteger,
	library_install_directory: *const SqlChar,
	library_install_directory_length: SqlInteger,
	library_error: *mut *mut SqlChar,
	library_error_length: *mut SqlInteger,
) -> SqlReturn {
	clear_error();
	let result = run("InstallExternalLibrary", || {
		let name = required(unsafe { text(library_name, library_name_length as i64)? }, "library name")?;
		let file = required(unsafe { text(library_file, library_file_length as i64)? }, "library file")?;
		let root = required(
			unsafe { text(library_install_directory, library_install_directory_length as i64)? },
			"install directory",
		)?;
		debug!(setup = %SessionId::from(setup_session_id), name, "installing library");
		install(name, Path::new(file), Path::new(root))
	});
	unsafe { report(result, library_error, library_error_length) }
}

/// Removes `library_name` from `library_install_directory`.
///
/// # Safety
///
/// See [`InstallExternalLibrary`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn UninstallExternalLibrary(
	setup_session_id: SqlGuid,
	library_name: *const SqlChar,
	library_name_length: SqlInteger,
	library_install_directory: *const SqlChar,
	library_install_directory_length: SqlInteger,
	library_error: *mut *mut SqlChar,
	library_error_length: *mut SqlInteger,
) -> SqlReturn {
	clear_error();
	let result = run("UninstallExternalLibrary", || {
		let name = required(unsafe { text(library_name, library_name_length as i64)? }, "library name")?;
		let root = required(
			unsafe { text(library_install_directory, library_install_directory_length as i64)? },
			"install directory",
		)?;
		debug!(setup = %SessionId::from(setup_session_id), name, "uninstalling library");
		uninstall(name, Path::new(root))
	});
	unsafe { report(result, library_error, library_error_length) }
}

fn install(name: &str, file: &Path, root: &Path) -> Result<()> {
	match global::current() {
		Some(extension) => extension.install_library(name, file, root).map(|_| ()),
		None => {
			let installation = LibraryManager::default().install(name, file, Scope::Public, root)?;
			info!(name = %installation.name, version = %installation.version, "library installed");
			Ok(())
		}
	}
}

fn uninstall(name: &str, root: &Path) -> Result<()> {
	match global::current() {
		Some(extension) => extension.uninstall_library(name, root),
		None => {
			LibraryManager::default().uninstall(name, Scope::Public, root)?;
			info!(name, "library uninstalled");
			Ok(())
		}
	}
}

/// Stores a failure message and points the host at it. Success hands out no message.
///
/// # Safety
///
/// Non-null out-pointers must be valid for writes.
unsafe fn report(
	result: std::result::Result<(), String>,
	error: *mut *mut SqlChar,
	error_length: *mut SqlInteger,
) -> SqlReturn {
	let (code, message, length) = match result {
		Ok(()) => (SQL_SUCCESS, ptr::null_mut(), 0),
		Err(message) => {
			let mut bytes = message.into_bytes();
			let length = bytes.len() as SqlInteger;
			bytes.push(0);
			let mut last = LAST_ERROR.lock();
			let stored = last.insert(bytes);
			(SQL_ERROR, stored.as_mut_ptr(), length)
		}
	};
	if !error.is_null() {
		unsafe { error.write(message) };
	}
	if !error_length.is_null() {
		unsafe { error_length.write(length) };
	}
	code
}

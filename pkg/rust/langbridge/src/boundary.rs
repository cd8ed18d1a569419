// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	panic::{AssertUnwindSafe, catch_unwind},
};

use langbridge_abi::{
	constants::{SQL_ERROR, SQL_SUCCESS},
	types::SqlReturn,
};
use langbridge_type::Result;
use tracing::error;

/// Runs one exported call. Errors and panics are logged and come back as their message.
pub(crate) fn run<T>(call: &'static str, f: impl FnOnce() -> Result<T>) -> std::result::Result<T, String> {
	match catch_unwind(AssertUnwindSafe(f)) {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(err)) => {
			error!(call, kind = %err.kind(), "{err}");
			Err(err.to_string())
		}
		Err(payload) => {
			let message = panic_message(payload.as_ref());
			error!(call, panic = %message, "call panicked");
			Err(format!("unexpected failure in {call}: {message}"))
		}
	}
}

/// [`run`], reduced to the host's return code.
pub(crate) fn guard(call: &'static str, f: impl FnOnce() -> Result<()>) -> SqlReturn {
	match run(call, f) {
		Ok(()) => SQL_SUCCESS,
		Err(_) => SQL_ERROR,
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		s.to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}

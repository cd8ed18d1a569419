// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use bumpalo::Bump;
use langbridge_type::Result;
use tracing::trace;

/// Runs `f` with a fresh arena that is dropped when `f` returns, whether it succeeded or not.
pub fn scoped<R>(what: &str, f: impl FnOnce(&Bump) -> Result<R>) -> Result<R> {
	let bump = Bump::new();
	let result = f(&bump);
	trace!(what, allocated = bump.allocated_bytes(), failed = result.is_err(), "arena drained");
	result
}

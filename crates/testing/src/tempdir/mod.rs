// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scratch directories for tests that write archives and install roots.

use std::{io, path::Path};

use tempfile::{Builder, TempDir};

/// A fresh `langbridge-*` directory, removed when dropped.
pub fn scratch() -> io::Result<TempDir> {
	Builder::new().prefix("langbridge-").tempdir()
}

/// Runs `f` in a scratch directory and hands back what it returns. The directory is removed
/// afterwards whether or not `f` succeeded.
pub fn temp_dir<R>(f: impl FnOnce(&Path) -> io::Result<R>) -> io::Result<R> {
	let dir = scratch()?;
	let result = f(dir.path());
	dir.close()?;
	result
}

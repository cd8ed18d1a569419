// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fmt, sync::Arc};

use langbridge_library::SearchPath;
use langbridge_type::Result;
use parking_lot::{Mutex, MutexGuard};
use tracing::warn;

use crate::frame::{Frame, ParamMap};

/// A script bound to a runtime-native execution target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub usize);

/// Arguments of one call into the runtime.
pub struct Invocation<'a, 'p> {
	/// Name the input table is bound under for the script
	pub input_name: &'p str,
	/// Name the script publishes its output table under
	pub output_name: &'p str,
	pub input: Frame<'a>,
	pub params: &'p mut ParamMap,
}

/// What a successful invocation left behind.
#[derive(Debug, Default)]
pub struct Outcome {
	pub output: Option<Frame<'static>>,
	pub stdout: String,
	pub stderr: String,
}

/// The embedded runtime, seen from the bridge.
///
/// Implementations are not assumed to be reentrant; every call goes through a [`RuntimeHandle`],
/// which serializes them.
pub trait Runtime: Send {
	fn name(&self) -> &str;

	/// Starts the runtime with the given package search path.
	fn initialize(&mut self, search_path: SearchPath) -> Result<()>;

	/// Looks up or loads the unit a script names.
	fn resolve(&mut self, script: &str) -> Result<UnitId>;

	/// Drops whatever a failed [`Runtime::resolve`] left behind for `script`.
	fn detach(&mut self, script: &str) -> Result<()>;

	fn invoke(&mut self, unit: UnitId, invocation: Invocation<'_, '_>) -> Result<Outcome>;

	/// Resets the runtime's own pending-error state.
	fn clear_error(&mut self);

	fn search_path(&self) -> &SearchPath;

	fn shutdown(&mut self) -> Result<()>;
}

/// Shared handle to the process-wide runtime. Cloning shares the same runtime and lock.
#[derive(Clone)]
pub struct RuntimeHandle(Arc<Mutex<Box<dyn Runtime>>>);

impl fmt::Debug for RuntimeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("RuntimeHandle").finish()
	}
}

impl RuntimeHandle {
	pub fn new(runtime: impl Runtime + 'static) -> Self {
		Self(Arc::new(Mutex::new(Box::new(runtime))))
	}

	pub fn from_boxed(runtime: Box<dyn Runtime>) -> Self {
		Self(Arc::new(Mutex::new(runtime)))
	}

	pub fn lock(&self) -> MutexGuard<'_, Box<dyn Runtime>> {
		self.0.lock()
	}

	pub fn resolve(&self, script: &str) -> Result<UnitId> {
		let mut runtime = self.lock();
		let result = runtime.resolve(script);
		if result.is_err() {
			runtime.clear_error();
		}
		result
	}

	/// Best effort: failures are logged and swallowed.
	pub fn detach(&self, script: &str) {
		let mut runtime = self.lock();
		if let Err(err) = runtime.detach(script) {
			warn!(script, error = %err, "detaching unit failed");
			runtime.clear_error();
		}
	}

	/// Runs one invocation; the runtime's error state is cleared before an error is returned.
	pub fn invoke(&self, unit: UnitId, invocation: Invocation<'_, '_>) -> Result<Outcome> {
		let mut runtime = self.lock();
		let result = runtime.invoke(unit, invocation);
		if result.is_err() {
			runtime.clear_error();
		}
		result
	}

	pub fn search_path(&self) -> SearchPath {
		self.lock().search_path().clone()
	}
}

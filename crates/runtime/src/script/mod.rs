// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A runtime whose units are native closures registered by name.
//!
//! A script is the name of the unit to run. Units see the input table, the parameter map and the
//! package search path through a [`UnitContext`].

pub mod builtin;
mod context;

use std::{
	any::Any,
	panic::{self, AssertUnwindSafe},
	sync::Arc,
};

pub use context::UnitContext;
use indexmap::IndexMap;
use langbridge_library::SearchPath;
use langbridge_type::{Error, Result};
use tracing::debug;

use crate::runtime::{Invocation, Outcome, Runtime, UnitId};

pub type UnitFn = Arc<dyn Fn(&mut UnitContext<'_, '_>) -> Result<()> + Send + Sync>;

#[derive(Default, Clone)]
pub struct UnitRegistry {
	units: IndexMap<String, UnitFn>,
}

impl UnitRegistry {
	pub fn register(
		&mut self,
		name: impl Into<String>,
		f: impl Fn(&mut UnitContext<'_, '_>) -> Result<()> + Send + Sync + 'static,
	) {
		self.units.insert(name.into(), Arc::new(f));
	}

	pub fn resolve(&self, name: &str) -> Option<UnitFn> {
		self.units.get(name).cloned()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.units.keys().map(String::as_str)
	}
}

pub struct ScriptRuntime {
	registry: UnitRegistry,
	bound: IndexMap<String, UnitFn>,
	search_path: SearchPath,
	error: Option<String>,
	running: bool,
}

impl ScriptRuntime {
	pub fn new(registry: UnitRegistry) -> Self {
		Self {
			registry,
			bound: IndexMap::new(),
			search_path: SearchPath::default(),
			error: None,
			running: false,
		}
	}

	/// A runtime carrying the [`builtin`] units.
	pub fn with_builtins() -> Self {
		let mut registry = UnitRegistry::default();
		builtin::register(&mut registry);
		Self::new(registry)
	}

	/// The error text of the last failed call, until [`Runtime::clear_error`].
	pub fn pending_error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	fn fail(&mut self, err: Error) -> Error {
		self.error = Some(err.to_string());
		err
	}

	fn ensure_running(&self) -> Result<()> {
		if !self.running {
			return Err(Error::NativeRuntimeFailure {
				class: "RuntimeError".to_string(),
				message: "runtime is not initialized".to_string(),
				trace: None,
			});
		}
		Ok(())
	}
}

impl Runtime for ScriptRuntime {
	fn name(&self) -> &str {
		"script"
	}

	fn initialize(&mut self, search_path: SearchPath) -> Result<()> {
		debug!(?search_path, units = self.registry.units.len(), "starting script runtime");
		self.search_path = search_path;
		self.running = true;
		Ok(())
	}

	fn resolve(&mut self, script: &str) -> Result<UnitId> {
		self.ensure_running()?;
		let name = script.trim();
		if let Some(index) = self.bound.get_index_of(name) {
			return Ok(UnitId(index));
		}

		match self.registry.resolve(name) {
			Some(unit) => {
				let (index, _) = self.bound.insert_full(name.to_string(), unit);
				Ok(UnitId(index))
			}
			None => Err(self.fail(Error::NativeRuntimeFailure {
				class: "LookupError".to_string(),
				message: format!("no unit named '{name}'"),
				trace: None,
			})),
		}
	}

	fn detach(&mut self, script: &str) -> Result<()> {
		// a failed lookup binds nothing
		debug!(script = script.trim(), "detach");
		Ok(())
	}

	fn invoke(&mut self, unit: UnitId, invocation: Invocation<'_, '_>) -> Result<Outcome> {
		self.ensure_running()?;
		let Some((name, f)) = self.bound.get_index(unit.0).map(|(n, f)| (n.clone(), f.clone())) else {
			return Err(self.fail(Error::NativeRuntimeFailure {
				class: "LookupError".to_string(),
				message: format!("unit {} is not bound", unit.0),
				trace: None,
			}));
		};

		let mut ctx = UnitContext {
			input_name: invocation.input_name,
			output_name: invocation.output_name,
			input: invocation.input,
			params: invocation.params,
			search_path: &self.search_path,
			output: None,
			stdout: String::new(),
			stderr: String::new(),
		};

		let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut ctx)));
		let UnitContext {
			output,
			stdout,
			stderr,
			..
		} = ctx;

		match result {
			Ok(Ok(())) => Ok(Outcome {
				output,
				stdout,
				stderr,
			}),
			Ok(Err(err)) => Err(self.fail(err)),
			Err(payload) => Err(self.fail(Error::NativeRuntimeFailure {
				class: "panic".to_string(),
				message: panic_message(payload.as_ref()),
				trace: Some(format!("in unit '{name}'")),
			})),
		}
	}

	fn clear_error(&mut self) {
		self.error = None;
	}

	fn search_path(&self) -> &SearchPath {
		&self.search_path
	}

	fn shutdown(&mut self) -> Result<()> {
		debug!("stopping script runtime");
		self.bound.clear();
		self.error = None;
		self.running = false;
		Ok(())
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

#[cfg(test)]
pub mod tests {
	use langbridge_type::{ErrorKind, Value};

	use super::*;
	use crate::frame::{Frame, NativeColumn, ParamMap};

	fn started(registry: UnitRegistry) -> ScriptRuntime {
		let mut runtime = ScriptRuntime::new(registry);
		runtime.initialize(SearchPath::default()).unwrap();
		runtime
	}

	fn invocation<'a, 'p>(input: Frame<'a>, params: &'p mut ParamMap) -> Invocation<'a, 'p> {
		Invocation {
			input_name: "InputDataSet",
			output_name: "OutputDataSet",
			input,
			params,
		}
	}

	#[test]
	fn test_resolve_is_stable_per_name() {
		let mut runtime = ScriptRuntime::with_builtins();
		runtime.initialize(SearchPath::default()).unwrap();
		let a = runtime.resolve("identity").unwrap();
		let b = runtime.resolve(" identity\n").unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn test_resolve_unknown_sets_pending_error() {
		let mut runtime = started(UnitRegistry::default());
		let err = runtime.resolve("missing").unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NativeRuntimeFailure);
		assert!(runtime.pending_error().is_some());
		runtime.clear_error();
		assert!(runtime.pending_error().is_none());
	}

	#[test]
	fn test_resolve_before_initialize_fails() {
		let mut runtime = ScriptRuntime::with_builtins();
		assert!(runtime.resolve("identity").is_err());
	}

	#[test]
	fn test_panicking_unit_becomes_runtime_failure() {
		let mut registry = UnitRegistry::default();
		registry.register("boom", |_| panic!("kaboom"));
		let mut runtime = started(registry);
		let unit = runtime.resolve("boom").unwrap();

		let mut params = ParamMap::new();
		let err = runtime.invoke(unit, invocation(Frame::default(), &mut params)).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NativeRuntimeFailure);
		assert!(err.to_string().contains("kaboom"));
		assert!(err.to_string().contains("in unit 'boom'"));
	}

	#[test]
	fn test_unit_sees_input_and_params() {
		let mut registry = UnitRegistry::default();
		registry.register("sum", |ctx| {
			let total: i64 = ctx.input()[0]
				.values()
				.map(|v| match v {
					Value::Int32(v) => v as i64,
					_ => 0,
				})
				.sum();
			ctx.print(format!("total {total}"));
			ctx.set_param("total", total);
			Ok(())
		});
		let mut runtime = started(registry);
		let unit = runtime.resolve("sum").unwrap();

		let mut params = ParamMap::new();
		params.insert("total".to_string(), Value::None);
		let input = Frame::new(vec![NativeColumn::new("x", vec![1i32, 2, 3])]);
		let outcome = runtime.invoke(unit, invocation(input, &mut params)).unwrap();
		assert!(outcome.output.is_none());
		assert_eq!(outcome.stdout, "total 6\n");
		assert_eq!(params["total"], Value::Int64(6));
	}

	#[test]
	fn test_shutdown_unbinds_units() {
		let mut runtime = ScriptRuntime::with_builtins();
		runtime.initialize(SearchPath::default()).unwrap();
		let unit = runtime.resolve("identity").unwrap();
		runtime.shutdown().unwrap();
		let mut params = ParamMap::new();
		assert!(runtime.invoke(unit, invocation(Frame::default(), &mut params)).is_err());
	}
}

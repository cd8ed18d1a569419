// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use langbridge_library::{LibraryInstallation, SearchPath};
use langbridge_type::{Error, Result, Value};

use crate::frame::{Frame, ParamMap};

/// Everything a unit can see and touch during one invocation.
pub struct UnitContext<'a, 'p> {
	pub(crate) input_name: &'p str,
	pub(crate) output_name: &'p str,
	pub(crate) input: Frame<'a>,
	pub(crate) params: &'p mut ParamMap,
	pub(crate) search_path: &'p SearchPath,
	pub(crate) output: Option<Frame<'static>>,
	pub(crate) stdout: String,
	pub(crate) stderr: String,
}

impl<'a, 'p> UnitContext<'a, 'p> {
	pub fn input_name(&self) -> &str {
		self.input_name
	}

	pub fn output_name(&self) -> &str {
		self.output_name
	}

	pub fn input(&self) -> &Frame<'a> {
		&self.input
	}

	pub fn params(&self) -> &ParamMap {
		self.params
	}

	pub fn param(&self, name: &str) -> Option<&Value> {
		self.params.get(name)
	}

	/// Assigns a parameter; assigning an undeclared name adds it to the map.
	pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.params.insert(name.into(), value.into());
	}

	pub fn set_output(&mut self, frame: Frame<'static>) {
		self.output = Some(frame);
	}

	pub fn print(&mut self, line: impl AsRef<str>) {
		self.stdout.push_str(line.as_ref());
		self.stdout.push('\n');
	}

	pub fn eprint(&mut self, line: impl AsRef<str>) {
		self.stderr.push_str(line.as_ref());
		self.stderr.push('\n');
	}

	/// Resolves an installed package the way the runtime's import machinery does: private scope
	/// first, then public.
	pub fn import(&self, package: &str) -> Result<LibraryInstallation> {
		self.search_path.find(package)?.ok_or_else(|| Error::NativeRuntimeFailure {
			class: "ModuleNotFoundError".to_string(),
			message: format!("no package named '{package}'"),
			trace: None,
		})
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Units every [`ScriptRuntime`](super::ScriptRuntime) built with `with_builtins` carries.

use langbridge_type::{Error, Result, Value};

use super::{UnitContext, UnitRegistry};
use crate::frame::{Frame, NativeColumn};

pub fn register(registry: &mut UnitRegistry) {
	registry.register("identity", identity);
	registry.register("count", count);
	registry.register("package_version", package_version);
}

/// Returns the input table unchanged.
fn identity(ctx: &mut UnitContext<'_, '_>) -> Result<()> {
	let output = ctx.input().clone().into_owned();
	ctx.set_output(output);
	Ok(())
}

/// Returns one row holding the number of input rows, and assigns it to the `count` parameter
/// when one is declared.
fn count(ctx: &mut UnitContext<'_, '_>) -> Result<()> {
	let rows = ctx.input().row_count() as i64;
	if ctx.param("count").is_some() {
		ctx.set_param("count", rows);
	}
	ctx.set_output(Frame::new(vec![NativeColumn::new("count", vec![rows])]));
	Ok(())
}

/// Imports the package named by the `package` parameter and assigns its version to `version`.
fn package_version(ctx: &mut UnitContext<'_, '_>) -> Result<()> {
	let package = match ctx.param("package") {
		Some(Value::Str(name)) => name.clone(),
		other => {
			return Err(Error::NativeRuntimeFailure {
				class: "TypeError".to_string(),
				message: format!("'package' must be a string, got {other:?}"),
				trace: None,
			});
		}
	};
	let installation = ctx.import(&package)?;
	ctx.print(format!("{} {} from {}", installation.name, installation.version, installation.root.display()));
	ctx.set_param("version", installation.version);
	Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Driving the builtin units through a shared runtime handle

use std::borrow::Cow;

use langbridge_library::{LibraryManager, Scope, SearchPath};
use langbridge_runtime::{ColumnData, Frame, Invocation, NativeColumn, ParamMap, Runtime, RuntimeHandle, ScriptRuntime};
use langbridge_testing::{package::PackageBuilder, tempdir::temp_dir};
use langbridge_type::{ErrorKind, Value};

fn started(search_path: SearchPath) -> RuntimeHandle {
	let mut runtime = ScriptRuntime::with_builtins();
	runtime.initialize(search_path).unwrap();
	RuntimeHandle::new(runtime)
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
fn test_count_assigns_declared_param() {
	let handle = started(SearchPath::default());
	let unit = handle.resolve("count").unwrap();

	let mut params = ParamMap::new();
	params.insert("count".to_string(), Value::None);
	let input = Frame::new(vec![NativeColumn::new("x", vec![1i32, 2, 3, 4])]);
	let outcome = handle.invoke(unit, invocation(input, &mut params)).unwrap();

	assert_eq!(params["count"], Value::Int64(4));
	let output = outcome.output.unwrap();
	assert_eq!(output.row_count(), 1);
	assert_eq!(output[0].get(0), Value::Int64(4));
}

#[test]
fn test_identity_output_outlives_input() {
	let handle = started(SearchPath::default());
	let unit = handle.resolve("identity").unwrap();

	let mut params = ParamMap::new();
	let outcome = {
		let data = vec![7i64, 8];
		let input = Frame::new(vec![NativeColumn::new("v", ColumnData::Int64(Cow::Borrowed(&data)))]);
		handle.invoke(unit, invocation(input, &mut params)).unwrap()
	};

	let output = outcome.output.unwrap();
	assert_eq!(output[0].name, "v");
	assert_eq!(output[0].values().collect::<Vec<_>>(), vec![Value::Int64(7), Value::Int64(8)]);
}

#[test]
fn test_failed_resolve_clears_runtime_error() {
	let handle = started(SearchPath::default());
	let err = handle.resolve("no_such_unit").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NativeRuntimeFailure);

	handle.detach("no_such_unit");
	assert!(handle.resolve("identity").is_ok());
}

#[test]
fn test_package_version_sees_installed_library() {
	temp_dir(|dir| {
		let private = dir.join("private");
		let public = dir.join("public");
		let archive = PackageBuilder::new("tiny-stats", "0.3.1")
			.module("tiny_stats/__init__.py", "")
			.write_library(&dir.join("archives"))?;
		LibraryManager::default().install("tiny-stats", &archive, Scope::Public, &public).unwrap();

		let handle = started(SearchPath::new(Some(private), Some(public)));
		let unit = handle.resolve("package_version").unwrap();

		let mut params = ParamMap::new();
		params.insert("package".to_string(), Value::str("tiny_stats"));
		params.insert("version".to_string(), Value::None);
		let outcome = handle.invoke(unit, invocation(Frame::default(), &mut params)).unwrap();

		assert_eq!(params["version"], Value::str("0.3.1"));
		assert!(outcome.stdout.starts_with("tiny-stats 0.3.1"));

		params.insert("package".to_string(), Value::str("absent"));
		let err = handle.invoke(unit, invocation(Frame::default(), &mut params)).unwrap_err();
		assert!(err.to_string().contains("ModuleNotFoundError"));
		Ok(())
	})
	.unwrap();
}

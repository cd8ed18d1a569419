// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Sessions driven through the extension the way the host drives them

use langbridge_abi::{
	constants::SQL_NULL_DATA,
	param::ParamDirection,
	session::{SessionId, SessionKey},
};
use langbridge_marshal::ColumnDescriptor;
use langbridge_param::ParamDeclaration;
use langbridge_runtime::{Frame, NativeColumn, ScriptRuntime, UnitRegistry, script::builtin};
use langbridge_session::{Extension, ExtensionConfig, SessionSpec, SessionState};
use langbridge_testing::{
	column::{int32_column, read_fixed, read_strings, string_column},
	package::PackageBuilder,
	tempdir::temp_dir,
};
use langbridge_type::{ErrorKind, TypeTag, Value};

fn registry() -> UnitRegistry {
	let mut registry = UnitRegistry::default();
	builtin::register(&mut registry);
	registry.register("shout", |ctx| {
		let shouted: Vec<Value> = ctx.input()[0]
			.values()
			.map(|v| match v {
				Value::Str(s) => Value::Str(s.to_uppercase()),
				other => other,
			})
			.collect();
		let suffix = match ctx.param("suffix") {
			Some(Value::Str(s)) => s.clone(),
			_ => String::new(),
		};
		ctx.print(format!("shouting {} rows", shouted.len()));
		ctx.set_param("label", format!("done{suffix}"));
		ctx.set_output(Frame::new(vec![NativeColumn::new("shouted", shouted)]));
		Ok(())
	});
	registry
}

fn extension(config: ExtensionConfig) -> Extension {
	Extension::init(config, Box::new(ScriptRuntime::new(registry()))).unwrap()
}

#[test]
fn test_full_session() {
	let extension = extension(ExtensionConfig::default());
	let key = SessionKey::new(SessionId::new(), 0);

	extension.init_session(key, SessionSpec::new("shout", 1, 2)).unwrap();
	extension.init_column(key, ColumnDescriptor::from_host(0, "name", 12, 16, 0, true, -1, -1).unwrap()).unwrap();
	extension.init_param(key, ParamDeclaration::from_host(0, "@suffix", 12, 8, 0, 1).unwrap(), Some(b"!"), 1).unwrap();
	extension.init_param(key, ParamDeclaration::from_host(1, "@label", 1, 5, 0, 4).unwrap(), None, SQL_NULL_DATA).unwrap();

	let input = string_column(&[Some("ada"), None, Some("grace")]);
	assert_eq!(extension.execute(key, 3, &[input.as_slice()]).unwrap(), 1);

	extension
		.with_session(key, |session| {
			assert_eq!(session.state(), SessionState::Executed);
			let column = session.result_column(0)?;
			assert_eq!(column.name, "shouted");
			assert_eq!(column.tag, TypeTag::VarString);
			assert_eq!(column.size, 5);
			assert!(column.nullable);
			assert_eq!(
				read_strings(&column.buffer),
				vec![Some("ADA".to_string()), None, Some("GRACE".to_string())]
			);

			let (bytes, indicator) = session.output_param(1)?;
			assert_eq!(bytes, b"done!");
			assert_eq!(indicator, 5);

			let err = session.output_param(0).unwrap_err();
			assert_eq!(err.kind(), ErrorKind::NotAnOutputParameter);
			Ok(())
		})
		.unwrap();

	let second = string_column(&[Some("x")]);
	extension.execute(key, 1, &[second.as_slice()]).unwrap();
	extension
		.with_session(key, |session| {
			let (rows, pointers) = session.results()?;
			assert_eq!(rows, 1);
			assert_eq!(pointers.len(), 1);
			assert!(!session.result_column(0)?.nullable);
			Ok(())
		})
		.unwrap();

	extension.cleanup_session(key);
	extension.cleanup_session(key);
	assert_eq!(extension.session_count(), 0);
	extension.shutdown().unwrap();
}

#[test]
fn test_integer_nulls_come_back_unchanged() {
	let extension = extension(ExtensionConfig::default());
	let key = SessionKey::new(SessionId::new(), 3);
	extension.init_session(key, SessionSpec::new("identity", 1, 0)).unwrap();
	extension.init_column(key, ColumnDescriptor::new(0, "n", TypeTag::Int32, 4)).unwrap();

	let input = int32_column(&[Some(10), None, Some(30)]);
	extension.execute(key, 3, &[input.as_slice()]).unwrap();
	extension
		.with_session(key, |session| {
			let column = session.result_column(0)?;
			assert_eq!(column.tag, TypeTag::Int32);
			assert_eq!(column.buffer.indicators, vec![4, SQL_NULL_DATA, 4]);
			assert_eq!(read_fixed::<i32>(&column.buffer), vec![Some(10), None, Some(30)]);
			Ok(())
		})
		.unwrap();
}

#[test]
fn test_execute_before_schema_is_a_violation() {
	let extension = extension(ExtensionConfig::default());
	let key = SessionKey::new(SessionId::new(), 0);
	extension.init_session(key, SessionSpec::new("identity", 2, 0)).unwrap();
	extension.init_column(key, ColumnDescriptor::new(0, "a", TypeTag::Int32, 4)).unwrap();

	let input = int32_column(&[Some(1)]);
	let err = extension.execute(key, 1, &[input.as_slice()]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::ContractViolation);
}

#[test]
fn test_unit_sees_libraries_installed_through_the_extension() {
	temp_dir(|dir| {
		let private = dir.join("private");
		let public = dir.join("public");
		let config = ExtensionConfig::new(None, None, public.to_str(), private.to_str());
		let extension = extension(config);

		let v1 = PackageBuilder::new("tiny-stats", "1.0")
			.module("tiny_stats/__init__.py", "")
			.write_library(&dir.join("v1"))?;
		let v2 = PackageBuilder::new("tiny-stats", "2.0")
			.module("tiny_stats/__init__.py", "")
			.write_library(&dir.join("v2"))?;
		let installed = extension.install_library("tiny-stats", &v1, &private).unwrap();
		assert_eq!(installed.scope, langbridge_library::Scope::Private);
		extension.install_library("tiny-stats", &v2, &public).unwrap();

		let key = SessionKey::new(SessionId::new(), 0);
		extension.init_session(key, SessionSpec::new("package_version", 0, 2)).unwrap();
		let package = ParamDeclaration::new(0, "@package", TypeTag::VarString, 32, ParamDirection::In);
		extension.init_param(key, package, Some(b"tiny_stats"), 10).unwrap();
		let version = ParamDeclaration::new(1, "@version", TypeTag::VarString, 16, ParamDirection::Out);
		extension.init_param(key, version, None, SQL_NULL_DATA).unwrap();

		let version = |extension: &Extension| {
			extension.execute(key, 0, &[]).unwrap();
			extension.with_session(key, |session| Ok(session.output_param(1)?.0.to_vec())).unwrap()
		};
		assert_eq!(version(&extension), b"1.0");

		extension.uninstall_library("tiny-stats", &private).unwrap();
		assert_eq!(version(&extension), b"2.0");
		Ok(())
	})
	.unwrap();
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Session lifecycle calls exported to the host.

#![allow(non_snake_case)]

use std::{ffi::c_void, ptr, slice};

use langbridge_abi::{
	constants::{EXTERNAL_LANGUAGE_EXTENSION_API, SQL_NO_NULLS, SQL_NULL_DATA, SQL_NULLABLE},
	data::ColumnSlice,
	session::{SessionId, SessionKey, SqlGuid},
	types::{SqlChar, SqlInteger, SqlPointer, SqlReturn, SqlSmallInt, SqlULen, SqlUSmallInt},
};
use langbridge_marshal::ColumnDescriptor;
use langbridge_param::ParamDeclaration;
use langbridge_session::{ExtensionConfig, SessionSpec};
use langbridge_type::{Error, Result, TypeTag, contract_violation};
use tracing::debug;

use crate::{
	boundary::guard,
	global,
	host::{put, required, text},
	library,
};

fn key(session_id: SqlGuid, task_id: SqlUSmallInt) -> SessionKey {
	SessionKey::new(SessionId::from(session_id), task_id)
}

#[unsafe(no_mangle)]
pub extern "C" fn GetInterfaceVersion() -> SqlUSmallInt {
	EXTERNAL_LANGUAGE_EXTENSION_API
}

/// Starts the process-wide runtime.
///
/// # Safety
///
/// Every non-null string must be valid for its length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Init(
	extension_params: *const SqlChar,
	extension_params_length: SqlULen,
	extension_path: *const SqlChar,
	extension_path_length: SqlULen,
	public_library_path: *const SqlChar,
	public_library_path_length: SqlULen,
	private_library_path: *const SqlChar,
	private_library_path_length: SqlULen,
) -> SqlReturn {
	guard("Init", || {
		let config = unsafe {
			ExtensionConfig::new(
				text(extension_params, extension_params_length as i64)?,
				text(extension_path, extension_path_length as i64)?,
				text(public_library_path, public_library_path_length as i64)?,
				text(private_library_path, private_library_path_length as i64)?,
			)
		};
		global::start(config.with_env())
	})
}

/// Opens a session and binds its script.
///
/// # Safety
///
/// Every non-null string must be valid for its length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn InitSession(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	num_tasks: SqlUSmallInt,
	script: *const SqlChar,
	script_length: SqlULen,
	input_schema_columns_number: SqlUSmallInt,
	parameters_number: SqlUSmallInt,
	input_data_name: *const SqlChar,
	input_data_name_length: SqlUSmallInt,
	output_data_name: *const SqlChar,
	output_data_name_length: SqlUSmallInt,
) -> SqlReturn {
	guard("InitSession", || {
		let script = required(unsafe { text(script, script_length as i64)? }, "script")?;
		let input_name = unsafe { text(input_data_name, input_data_name_length as i64)? };
		let output_name = unsafe { text(output_data_name, output_data_name_length as i64)? };
		let spec = SessionSpec::new(script, input_schema_columns_number, parameters_number)
			.task_count(num_tasks)
			.data_names(input_name, output_name);
		global::extension()?.init_session(key(session_id, task_id), spec)
	})
}

/// Declares one input column.
///
/// # Safety
///
/// A non-null name must be valid for its length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn InitColumn(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	column_number: SqlUSmallInt,
	column_name: *const SqlChar,
	column_name_length: SqlSmallInt,
	data_type: SqlSmallInt,
	column_size: SqlULen,
	decimal_digits: SqlSmallInt,
	nullable: SqlSmallInt,
	partition_by_number: SqlSmallInt,
	order_by_number: SqlSmallInt,
) -> SqlReturn {
	guard("InitColumn", || {
		let name = unsafe { text(column_name, column_name_length as i64)? }.unwrap_or_default();
		let descriptor = ColumnDescriptor::from_host(
			column_number,
			name,
			data_type,
			column_size,
			decimal_digits,
			nullable != SQL_NO_NULLS,
			partition_by_number,
			order_by_number,
		)?;
		global::extension()?.init_column(key(session_id, task_id), descriptor)
	})
}

/// Declares one parameter and copies its value.
///
/// # Safety
///
/// A non-null name must be valid for its length. A non-null value must be valid for the type's
/// width, or for `str_len_or_ind` bytes when the type is variable-length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn InitParam(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	param_number: SqlUSmallInt,
	param_name: *const SqlChar,
	param_name_length: SqlSmallInt,
	data_type: SqlSmallInt,
	param_size: SqlULen,
	decimal_digits: SqlSmallInt,
	param_value: SqlPointer,
	str_len_or_ind: SqlInteger,
	input_output_type: SqlSmallInt,
) -> SqlReturn {
	guard("InitParam", || {
		let name = required(unsafe { text(param_name, param_name_length as i64)? }, "parameter name")?;
		let declaration = ParamDeclaration::from_host(
			param_number,
			name,
			data_type,
			param_size,
			decimal_digits,
			input_output_type,
		)?;
		let value = unsafe { param_bytes(declaration.tag, param_value, str_len_or_ind)? };
		global::extension()?.init_param(key(session_id, task_id), declaration, value, str_len_or_ind)
	})
}

/// The bytes of a parameter value. A null pointer or a NULL indicator is no value.
///
/// # Safety
///
/// See [`InitParam`].
unsafe fn param_bytes<'a>(tag: TypeTag, value: *const c_void, indicator: i32) -> Result<Option<&'a [u8]>> {
	if value.is_null() || indicator == SQL_NULL_DATA {
		return Ok(None);
	}
	let len = match tag.fixed_width() {
		Some(width) => width,
		None if indicator >= 0 => indicator as usize,
		None => return Err(Error::malformed(format!("{tag} parameter has indicator {indicator}"))),
	};
	Ok(Some(unsafe { slice::from_raw_parts(value as *const u8, len) }))
}

/// Runs one batch. The number of output columns is written to `output_schema_columns_number`.
///
/// # Safety
///
/// `data` and `str_len_or_ind` must hold one entry per declared column, each valid for
/// `row_count` rows of the column's type.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Execute(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	row_count: SqlULen,
	data: *mut SqlPointer,
	str_len_or_ind: *mut *mut SqlInteger,
	output_schema_columns_number: *mut SqlUSmallInt,
) -> SqlReturn {
	guard("Execute", || {
		let extension = global::extension()?;
		let rows = row_count as usize;
		let columns = extension.with_session(key(session_id, task_id), |session| {
			let count = session.spec().column_count as usize;
			let mut inputs = Vec::with_capacity(count);
			for id in 0..count {
				let descriptor = session
					.column(id as u16)
					.ok_or_else(|| contract_violation!("execute before column {id} was initialized"))?;
				let (buffer, indicators) = unsafe { column_pointers(data, str_len_or_ind, id)? };
				inputs.push(unsafe { ColumnSlice::from_raw(descriptor.tag, buffer, indicators, rows)? });
			}
			session.execute(extension.runtime(), rows, &inputs)
		})?;
		unsafe { put(output_schema_columns_number, columns, "output column count") }
	})
}

/// The data and indicator pointers of input column `id`.
///
/// # Safety
///
/// Non-null arrays must hold more than `id` entries.
unsafe fn column_pointers(
	data: *const SqlPointer,
	indicators: *const *mut SqlInteger,
	id: usize,
) -> Result<(*const c_void, *const i32)> {
	if data.is_null() {
		return Err(Error::malformed("column data array is null"));
	}
	let buffer = unsafe { *data.add(id) } as *const c_void;
	let indicators = if indicators.is_null() {
		ptr::null()
	} else {
		unsafe { *indicators.add(id) as *const i32 }
	};
	Ok((buffer, indicators))
}

/// Describes output column `column_number` of the last batch.
///
/// # Safety
///
/// Every out-pointer must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GetResultColumn(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	column_number: SqlUSmallInt,
	data_type: *mut SqlSmallInt,
	column_size: *mut SqlULen,
	decimal_digits: *mut SqlSmallInt,
	nullable: *mut SqlSmallInt,
) -> SqlReturn {
	guard("GetResultColumn", || {
		global::extension()?.with_session(key(session_id, task_id), |session| {
			let column = session.result_column(column_number)?;
			let null_flag = if column.nullable {
				SQL_NULLABLE
			} else {
				SQL_NO_NULLS
			};
			unsafe {
				put(data_type, column.tag.code(), "data type")?;
				put(column_size, column.size, "column size")?;
				put(decimal_digits, column.decimal_digits, "decimal digits")?;
				put(nullable, null_flag, "nullable")
			}
		})
	})
}

/// Hands out the row count and the per-column data and indicator arrays of the last batch.
///
/// # Safety
///
/// Every out-pointer must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GetResults(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	row_count: *mut SqlULen,
	data: *mut *mut SqlPointer,
	str_len_or_ind: *mut *mut *mut SqlInteger,
) -> SqlReturn {
	guard("GetResults", || {
		global::extension()?.with_session(key(session_id, task_id), |session| {
			let (rows, pointers) = session.results()?;
			debug!(rows, columns = pointers.len(), "results handed out");
			unsafe {
				put(row_count, rows as SqlULen, "row count")?;
				put(data, pointers.data() as *mut SqlPointer, "data")?;
				put(str_len_or_ind, pointers.indicators() as *mut *mut SqlInteger, "indicators")
			}
		})
	})
}

/// Hands out output parameter `param_number`. A NULL value comes back as a null pointer.
///
/// # Safety
///
/// Every out-pointer must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GetOutputParam(
	session_id: SqlGuid,
	task_id: SqlUSmallInt,
	param_number: SqlUSmallInt,
	param_value: *mut SqlPointer,
	str_len_or_ind: *mut SqlInteger,
) -> SqlReturn {
	guard("GetOutputParam", || {
		global::extension()?.with_session(key(session_id, task_id), |session| {
			let (bytes, indicator) = session.output_param(param_number)?;
			let value = if indicator == SQL_NULL_DATA {
				ptr::null_mut()
			} else {
				bytes.as_ptr() as SqlPointer
			};
			unsafe {
				put(param_value, value, "parameter value")?;
				put(str_len_or_ind, indicator, "indicator")
			}
		})
	})
}

#[unsafe(no_mangle)]
pub extern "C" fn CleanupSession(session_id: SqlGuid, task_id: SqlUSmallInt) -> SqlReturn {
	guard("CleanupSession", || {
		match global::current() {
			Some(extension) => extension.cleanup_session(key(session_id, task_id)),
			None => debug!("cleanup session without a running extension"),
		}
		Ok(())
	})
}

/// Tears the runtime down and releases the last library error message.
#[unsafe(no_mangle)]
pub extern "C" fn Cleanup() -> SqlReturn {
	guard("Cleanup", || {
		library::clear_error();
		global::stop()
	})
}

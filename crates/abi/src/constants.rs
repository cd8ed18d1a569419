// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// Version of the call surface reported by `GetInterfaceVersion`.
pub const EXTERNAL_LANGUAGE_EXTENSION_API: u16 = 2;

pub const SQL_SUCCESS: i16 = 0;
pub const SQL_ERROR: i16 = -1;

/// Indicator value marking a NULL row or parameter.
pub const SQL_NULL_DATA: i32 = -1;

pub const SQL_NO_NULLS: i16 = 0;
pub const SQL_NULLABLE: i16 = 1;

pub const SQL_PARAM_INPUT: i16 = 1;
pub const SQL_PARAM_INPUT_OUTPUT: i16 = 2;
pub const SQL_PARAM_OUTPUT: i16 = 4;

/// Marker prefixed to parameter names by the host.
pub const PARAM_NAME_MARKER: char = '@';

pub const DEFAULT_INPUT_DATA_NAME: &str = "InputDataSet";
pub const DEFAULT_OUTPUT_DATA_NAME: &str = "OutputDataSet";

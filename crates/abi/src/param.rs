// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use langbridge_type::{Result, return_contract_violation};
use serde::{Deserialize, Serialize};

use crate::constants::{SQL_PARAM_INPUT, SQL_PARAM_INPUT_OUTPUT, SQL_PARAM_OUTPUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamDirection {
	In,
	InOut,
	Out,
}

impl ParamDirection {
	pub fn from_code(code: i16) -> Result<Self> {
		match code {
			SQL_PARAM_INPUT => Ok(ParamDirection::In),
			SQL_PARAM_INPUT_OUTPUT => Ok(ParamDirection::InOut),
			SQL_PARAM_OUTPUT => Ok(ParamDirection::Out),
			other => return_contract_violation!("unknown parameter direction {other}"),
		}
	}

	pub fn code(&self) -> i16 {
		match self {
			ParamDirection::In => SQL_PARAM_INPUT,
			ParamDirection::InOut => SQL_PARAM_INPUT_OUTPUT,
			ParamDirection::Out => SQL_PARAM_OUTPUT,
		}
	}

	pub fn is_output(&self) -> bool {
		!matches!(self, ParamDirection::In)
	}
}

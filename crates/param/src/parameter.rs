// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use langbridge_abi::{
	constants::{PARAM_NAME_MARKER, SQL_NULL_DATA},
	param::ParamDirection,
};
use langbridge_marshal::scalar;
use langbridge_type::{Error, Result, TypeTag, Value, return_contract_violation};

/// Strips the host's leading `@` marker from a parameter name.
pub fn strip_marker(name: &str) -> &str {
	name.strip_prefix(PARAM_NAME_MARKER).unwrap_or(name)
}

/// Everything `InitParam` says about a parameter except its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDeclaration {
	pub id: u16,
	/// Marker-stripped
	pub name: String,
	pub tag: TypeTag,
	pub size: u64,
	pub decimal_digits: i16,
	pub direction: ParamDirection,
}

impl ParamDeclaration {
	pub fn new(id: u16, name: &str, tag: TypeTag, size: u64, direction: ParamDirection) -> Self {
		let decimal_digits = match tag {
			TypeTag::Decimal {
				scale,
				..
			} => scale as i16,
			_ => 0,
		};
		Self {
			id,
			name: strip_marker(name).to_string(),
			tag,
			size,
			decimal_digits,
			direction,
		}
	}

	/// Resolves host type and direction codes.
	pub fn from_host(
		id: u16,
		name: &str,
		type_code: i16,
		size: u64,
		decimal_digits: i16,
		direction_code: i16,
	) -> Result<Self> {
		Ok(Self {
			id,
			name: strip_marker(name).to_string(),
			tag: TypeTag::from_code(type_code, size, decimal_digits)?,
			size,
			decimal_digits,
			direction: ParamDirection::from_code(direction_code)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
	pub declaration: ParamDeclaration,
	value: Vec<u8>,
	indicator: i32,
}

impl Parameter {
	/// Deep-copies the caller's value. Fixed-width types copy their width; variable ones
	/// `indicator` bytes. Strings are then fitted to the declared size: truncated when longer,
	/// and right-padded with spaces for the fixed-length kinds.
	pub(crate) fn new(declaration: ParamDeclaration, value: Option<&[u8]>, indicator: i32) -> Result<Self> {
		scalar::validate_size(declaration.tag, declaration.size)?;

		if indicator == SQL_NULL_DATA {
			return Ok(Self {
				declaration,
				value: Vec::new(),
				indicator,
			});
		}
		if indicator < 0 {
			return Err(Error::malformed(format!(
				"parameter '{}' has invalid indicator {indicator}",
				declaration.name
			)));
		}
		let Some(value) = value else {
			return_contract_violation!(
				"parameter '{}' has indicator {indicator} but no value",
				declaration.name
			);
		};

		let len = declaration.tag.fixed_width().unwrap_or(indicator as usize);
		let Some(bytes) = value.get(..len) else {
			return Err(Error::malformed(format!(
				"parameter '{}' needs {len} bytes, got {}",
				declaration.name,
				value.len()
			)));
		};

		let value = if declaration.tag.is_string() {
			fit_text(declaration.tag, declaration.size, bytes)?
		} else {
			bytes.to_vec()
		};
		Ok(Self {
			indicator: value.len() as i32,
			value,
			declaration,
		})
	}

	pub fn name(&self) -> &str {
		&self.declaration.name
	}

	pub fn is_null(&self) -> bool {
		self.indicator == SQL_NULL_DATA
	}

	pub fn indicator(&self) -> i32 {
		self.indicator
	}

	/// The owned value bytes; empty for NULL.
	pub fn bytes(&self) -> &[u8] {
		&self.value
	}

	pub fn to_native(&self) -> Result<Value> {
		if self.is_null() {
			return Ok(Value::None);
		}
		scalar::decode(self.declaration.tag, &self.value)
	}

	/// Replaces the value with `value` converted under the declared type and size.
	pub(crate) fn assign(&mut self, value: &Value) -> Result<()> {
		let encoded = scalar::encode(self.declaration.tag, self.declaration.size, value)?;
		self.value = Vec::new();
		match encoded {
			Some(bytes) => {
				self.indicator = bytes.len() as i32;
				self.value = bytes;
			}
			None => self.indicator = SQL_NULL_DATA,
		}
		Ok(())
	}
}

fn fit_text(tag: TypeTag, size: u64, bytes: &[u8]) -> Result<Vec<u8>> {
	let text = if tag.is_wide() {
		scalar::decode_wide(bytes)?
	} else {
		scalar::decode_narrow(bytes)?.to_string()
	};
	Ok(scalar::encode_text(tag, size, &text))
}

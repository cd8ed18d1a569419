// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, wire};

/// Declared sizes at or above this value mean "max-sized": string and binary values are never
/// truncated.
pub const UNBOUNDED_SIZE: u64 = u16::MAX as u64;

/// Maximum precision a host decimal can carry.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

pub const CODE_BIT: i16 = -7;
pub const CODE_UTINYINT: i16 = -28;
pub const CODE_SSHORT: i16 = -15;
pub const CODE_SLONG: i16 = -16;
pub const CODE_SBIGINT: i16 = -25;
pub const CODE_FLOAT: i16 = 7;
pub const CODE_DOUBLE: i16 = 8;
pub const CODE_CHAR: i16 = 1;
pub const CODE_VARCHAR: i16 = 12;
pub const CODE_WCHAR: i16 = -8;
pub const CODE_WVARCHAR: i16 = -9;
pub const CODE_BINARY: i16 = -2;
pub const CODE_VARBINARY: i16 = -3;
pub const CODE_GUID: i16 = -11;
pub const CODE_TYPE_DATE: i16 = 91;
pub const CODE_TYPE_TIMESTAMP: i16 = 93;
pub const CODE_NUMERIC: i16 = 2;

/// The closed set of primitive kinds exchanged with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
	/// A 2-byte signed integer
	Int16,
	/// A 4-byte signed integer
	Int32,
	/// An 8-byte signed integer
	Int64,
	/// A 1-byte unsigned integer
	UInt8,
	/// A 1-byte boolean
	Boolean,
	/// A 4-byte floating point
	Float32,
	/// An 8-byte floating point
	Float64,
	/// Narrow (UTF-8) text padded to the declared size
	FixedString,
	/// Narrow (UTF-8) text up to the declared size
	VarString,
	/// Wide (UTF-16LE) text padded to the declared size in code units
	WideFixedString,
	/// Wide (UTF-16LE) text up to the declared size in code units
	WideVarString,
	/// Raw bytes up to the declared size
	Binary,
	/// A 16-byte GUID
	Guid,
	/// A calendar date
	Date,
	/// A calendar date and time of day
	Timestamp,
	/// A fixed-point decimal
	Decimal {
		precision: u8,
		scale: i8,
	},
}

impl TypeTag {
	/// Resolves a host type code. `size` and `decimal_digits` only matter for decimals, where they
	/// carry the precision and the scale.
	pub fn from_code(code: i16, size: u64, decimal_digits: i16) -> Result<Self> {
		Ok(match code {
			CODE_BIT => TypeTag::Boolean,
			CODE_UTINYINT => TypeTag::UInt8,
			CODE_SSHORT => TypeTag::Int16,
			CODE_SLONG => TypeTag::Int32,
			CODE_SBIGINT => TypeTag::Int64,
			CODE_FLOAT => TypeTag::Float32,
			CODE_DOUBLE => TypeTag::Float64,
			CODE_CHAR => TypeTag::FixedString,
			CODE_VARCHAR => TypeTag::VarString,
			CODE_WCHAR => TypeTag::WideFixedString,
			CODE_WVARCHAR => TypeTag::WideVarString,
			CODE_BINARY | CODE_VARBINARY => TypeTag::Binary,
			CODE_GUID => TypeTag::Guid,
			CODE_TYPE_DATE => TypeTag::Date,
			CODE_TYPE_TIMESTAMP => TypeTag::Timestamp,
			CODE_NUMERIC => {
				let precision = u8::try_from(size)
					.ok()
					.filter(|p| *p <= MAX_DECIMAL_PRECISION)
					.ok_or_else(|| Error::unsupported(format!("decimal precision {size}")))?;
				let scale = i8::try_from(decimal_digits)
					.ok()
					.filter(|s| *s >= 0 && (*s as u8) <= MAX_DECIMAL_PRECISION)
					.ok_or_else(|| Error::unsupported(format!("decimal scale {decimal_digits}")))?;
				TypeTag::Decimal {
					precision,
					scale,
				}
			}
			other => return Err(Error::unsupported(format!("host type code {other}"))),
		})
	}

	pub fn code(&self) -> i16 {
		match self {
			TypeTag::Boolean => CODE_BIT,
			TypeTag::UInt8 => CODE_UTINYINT,
			TypeTag::Int16 => CODE_SSHORT,
			TypeTag::Int32 => CODE_SLONG,
			TypeTag::Int64 => CODE_SBIGINT,
			TypeTag::Float32 => CODE_FLOAT,
			TypeTag::Float64 => CODE_DOUBLE,
			TypeTag::FixedString => CODE_CHAR,
			TypeTag::VarString => CODE_VARCHAR,
			TypeTag::WideFixedString => CODE_WCHAR,
			TypeTag::WideVarString => CODE_WVARCHAR,
			TypeTag::Binary => CODE_BINARY,
			TypeTag::Guid => CODE_GUID,
			TypeTag::Date => CODE_TYPE_DATE,
			TypeTag::Timestamp => CODE_TYPE_TIMESTAMP,
			TypeTag::Decimal {
				..
			} => CODE_NUMERIC,
		}
	}

	/// Byte width of one value for fixed-stride types, `None` for length-prefixed ones.
	pub fn fixed_width(&self) -> Option<usize> {
		match self {
			TypeTag::Boolean | TypeTag::UInt8 => Some(1),
			TypeTag::Int16 => Some(2),
			TypeTag::Int32 | TypeTag::Float32 => Some(4),
			TypeTag::Int64 | TypeTag::Float64 => Some(8),
			TypeTag::Guid => Some(wire::GuidStruct::SIZE),
			TypeTag::Date => Some(wire::DateStruct::SIZE),
			TypeTag::Timestamp => Some(wire::TimestampStruct::SIZE),
			TypeTag::Decimal {
				..
			} => Some(wire::NumericStruct::SIZE),
			TypeTag::FixedString
			| TypeTag::VarString
			| TypeTag::WideFixedString
			| TypeTag::WideVarString
			| TypeTag::Binary => None,
		}
	}

	pub fn is_variable(&self) -> bool {
		self.fixed_width().is_none()
	}

	pub fn is_string(&self) -> bool {
		matches!(
			self,
			TypeTag::FixedString | TypeTag::VarString | TypeTag::WideFixedString | TypeTag::WideVarString
		)
	}

	pub fn is_wide(&self) -> bool {
		matches!(self, TypeTag::WideFixedString | TypeTag::WideVarString)
	}

	pub fn is_padded(&self) -> bool {
		matches!(self, TypeTag::FixedString | TypeTag::WideFixedString)
	}

	/// Bytes per character unit for string types.
	pub fn char_width(&self) -> usize {
		if self.is_wide() {
			2
		} else {
			1
		}
	}
}

impl Display for TypeTag {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			TypeTag::Int16 => f.write_str("Int16"),
			TypeTag::Int32 => f.write_str("Int32"),
			TypeTag::Int64 => f.write_str("Int64"),
			TypeTag::UInt8 => f.write_str("UInt8"),
			TypeTag::Boolean => f.write_str("Boolean"),
			TypeTag::Float32 => f.write_str("Float32"),
			TypeTag::Float64 => f.write_str("Float64"),
			TypeTag::FixedString => f.write_str("FixedString"),
			TypeTag::VarString => f.write_str("VarString"),
			TypeTag::WideFixedString => f.write_str("WideFixedString"),
			TypeTag::WideVarString => f.write_str("WideVarString"),
			TypeTag::Binary => f.write_str("Binary"),
			TypeTag::Guid => f.write_str("Guid"),
			TypeTag::Date => f.write_str("Date"),
			TypeTag::Timestamp => f.write_str("Timestamp"),
			TypeTag::Decimal {
				precision,
				scale,
			} => write!(f, "Decimal({precision}, {scale})"),
		}
	}
}

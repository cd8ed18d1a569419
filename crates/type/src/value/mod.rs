// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

mod date;
mod datetime;

pub use date::Date;
pub use datetime::DateTime;

use crate::registry::NativeType;

/// A value as the embedded runtime sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// Missing value (the runtime's null)
	None,
	/// A boolean: true or false.
	Bool(bool),
	/// A 1-byte unsigned integer
	UInt8(u8),
	/// A 2-byte signed integer
	Int16(i16),
	/// A 4-byte signed integer
	Int32(i32),
	/// An 8-byte signed integer
	Int64(i64),
	/// A 4-byte floating point
	Float32(f32),
	/// An 8-byte floating point
	Float64(f64),
	/// A text string
	Str(String),
	/// A byte string
	Bytes(Vec<u8>),
	/// A 16-byte UUID
	Uuid(uuid::Uuid),
	/// A calendar date
	Date(Date),
	/// A date and time of day, microsecond resolution
	DateTime(DateTime),
	/// An arbitrary-precision decimal
	Decimal(BigDecimal),
	/// Not-a-time, the missing marker of temporal columns
	NaT,
	/// An instance of a runtime class with no host equivalent
	Object {
		class: String,
	},
}

impl Value {
	/// True for values that travel to the host as NULL: `None`, `NaT`, NaN and infinities.
	pub fn is_missing(&self) -> bool {
		match self {
			Value::None | Value::NaT => true,
			Value::Float32(v) => !v.is_finite(),
			Value::Float64(v) => !v.is_finite(),
			_ => false,
		}
	}

	pub fn native_type(&self) -> NativeType {
		match self {
			Value::None => NativeType::None,
			Value::Bool(_) => NativeType::Bool,
			Value::UInt8(_) => NativeType::UInt8,
			Value::Int16(_) => NativeType::Int16,
			Value::Int32(_) => NativeType::Int32,
			Value::Int64(_) => NativeType::Int64,
			Value::Float32(_) => NativeType::Float32,
			Value::Float64(_) => NativeType::Float64,
			Value::Str(_) => NativeType::Str,
			Value::Bytes(_) => NativeType::Bytes,
			Value::Uuid(_) => NativeType::Uuid,
			Value::Date(_) => NativeType::Date,
			Value::DateTime(_) | Value::NaT => NativeType::DateTime,
			Value::Decimal(_) => NativeType::Decimal,
			Value::Object {
				class,
			} => NativeType::Object(class.clone()),
		}
	}

	pub fn str(value: impl Into<String>) -> Self {
		Value::Str(value.into())
	}

	pub fn object(class: impl Into<String>) -> Self {
		Value::Object {
			class: class.into(),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::None => f.write_str("None"),
			Value::Bool(v) => write!(f, "{v}"),
			Value::UInt8(v) => write!(f, "{v}"),
			Value::Int16(v) => write!(f, "{v}"),
			Value::Int32(v) => write!(f, "{v}"),
			Value::Int64(v) => write!(f, "{v}"),
			Value::Float32(v) => write!(f, "{v}"),
			Value::Float64(v) => write!(f, "{v}"),
			Value::Str(v) => write!(f, "{v}"),
			Value::Bytes(v) => {
				f.write_str("0x")?;
				for b in v {
					write!(f, "{b:02x}")?;
				}
				Ok(())
			}
			Value::Uuid(v) => write!(f, "{v}"),
			Value::Date(v) => write!(f, "{v}"),
			Value::DateTime(v) => write!(f, "{v}"),
			Value::Decimal(v) => write!(f, "{v}"),
			Value::NaT => f.write_str("NaT"),
			Value::Object {
				class,
			} => write!(f, "<{class} object>"),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int32(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int64(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float64(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Str(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		match v {
			Some(v) => v.into(),
			None => Value::None,
		}
	}
}

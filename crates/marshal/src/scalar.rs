// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Conversion of single values between host bytes and native [`Value`]s.
//!
//! These rules are shared by parameters and by the boxed rows of columns:
//! - fixed-width types are exactly their width;
//! - fixed strings are truncated or space-padded to exactly the declared size;
//! - variable strings and binary are only ever truncated;
//! - wide strings count the size in UTF-16 units and pad with U+0020;
//! - a size of [`UNBOUNDED_SIZE`] or more never truncates.

use std::str;

use bigdecimal::BigDecimal;
use langbridge_type::{
	DateTime, Error, Result, TypeTag, UNBOUNDED_SIZE, Value,
	wire::{DateStruct, GuidStruct, NumericStruct, TimestampStruct, is_bit_true},
};
use num_traits::ToPrimitive;

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
	let mut out = [0u8; N];
	out.copy_from_slice(&bytes[..N]);
	out
}

/// Checks a declared size against the tag; fixed-width types must declare their width.
pub fn validate_size(tag: TypeTag, size: u64) -> Result<()> {
	match tag {
		TypeTag::Decimal {
			..
		} => Ok(()),
		_ => match tag.fixed_width() {
			Some(width) if size != width as u64 => {
				Err(Error::malformed(format!("{tag} must be declared with size {width}, got {size}")))
			}
			_ => Ok(()),
		},
	}
}

pub fn decode_narrow(bytes: &[u8]) -> Result<&str> {
	str::from_utf8(bytes)
		.map_err(|err| Error::malformed(format!("invalid UTF-8 after {} bytes", err.valid_up_to())))
}

pub fn decode_wide(bytes: &[u8]) -> Result<String> {
	if bytes.len() % 2 != 0 {
		return Err(Error::malformed(format!("wide string of odd length {}", bytes.len())));
	}
	let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
	String::from_utf16(&units).map_err(|_| Error::malformed("invalid UTF-16"))
}

/// The native value of one non-NULL host value of `tag`.
pub fn decode(tag: TypeTag, bytes: &[u8]) -> Result<Value> {
	if let Some(width) = tag.fixed_width() {
		if bytes.len() < width {
			return Err(Error::malformed(format!("{tag} value needs {width} bytes, got {}", bytes.len())));
		}
	}

	Ok(match tag {
		TypeTag::Boolean => Value::Bool(is_bit_true(bytes[0])),
		TypeTag::UInt8 => Value::UInt8(bytes[0]),
		TypeTag::Int16 => Value::Int16(i16::from_le_bytes(array(bytes))),
		TypeTag::Int32 => Value::Int32(i32::from_le_bytes(array(bytes))),
		TypeTag::Int64 => Value::Int64(i64::from_le_bytes(array(bytes))),
		TypeTag::Float32 => Value::Float32(f32::from_le_bytes(array(bytes))),
		TypeTag::Float64 => Value::Float64(f64::from_le_bytes(array(bytes))),
		TypeTag::FixedString | TypeTag::VarString => Value::Str(decode_narrow(bytes)?.to_string()),
		TypeTag::WideFixedString | TypeTag::WideVarString => Value::Str(decode_wide(bytes)?),
		TypeTag::Binary => Value::Bytes(bytes.to_vec()),
		TypeTag::Guid => Value::Uuid(GuidStruct::from_bytes(bytes)?.to_uuid()),
		TypeTag::Date => Value::Date(DateStruct::from_bytes(bytes)?.to_date()?),
		TypeTag::Timestamp => Value::DateTime(TimestampStruct::from_bytes(bytes)?.to_datetime()?),
		TypeTag::Decimal {
			scale,
			..
		} => Value::Decimal(NumericStruct::from_bytes(bytes)?.to_decimal(scale)),
	})
}

fn float_integral(v: f64) -> Option<i64> {
	(v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

fn integral(value: &Value) -> Option<i64> {
	match value {
		Value::Bool(v) => Some(i64::from(*v)),
		Value::UInt8(v) => Some(i64::from(*v)),
		Value::Int16(v) => Some(i64::from(*v)),
		Value::Int32(v) => Some(i64::from(*v)),
		Value::Int64(v) => Some(*v),
		Value::Float32(v) => float_integral(f64::from(*v)),
		Value::Float64(v) => float_integral(*v),
		Value::Decimal(d) if d.is_integer() => d.to_i64(),
		_ => None,
	}
}

fn is_midnight(dt: &DateTime) -> bool {
	dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && dt.microsecond() == 0
}

/// `value` as the native type of `tag`, when that loses nothing.
pub fn coerce(value: &Value, tag: TypeTag) -> Option<Value> {
	match tag {
		TypeTag::Boolean => match value {
			Value::Bool(v) => Some(Value::Bool(*v)),
			other => match integral(other)? {
				0 => Some(Value::Bool(false)),
				1 => Some(Value::Bool(true)),
				_ => None,
			},
		},
		TypeTag::UInt8 => integral(value).and_then(|v| u8::try_from(v).ok()).map(Value::UInt8),
		TypeTag::Int16 => integral(value).and_then(|v| i16::try_from(v).ok()).map(Value::Int16),
		TypeTag::Int32 => integral(value).and_then(|v| i32::try_from(v).ok()).map(Value::Int32),
		TypeTag::Int64 => integral(value).map(Value::Int64),
		TypeTag::Float32 => match value {
			Value::Float32(v) => Some(Value::Float32(*v)),
			Value::Float64(v) => {
				let narrowed = *v as f32;
				(f64::from(narrowed) == *v).then_some(Value::Float32(narrowed))
			}
			other => integral(other).filter(|v| v.unsigned_abs() <= 1 << 24).map(|v| Value::Float32(v as f32)),
		},
		TypeTag::Float64 => match value {
			Value::Float64(v) => Some(Value::Float64(*v)),
			Value::Float32(v) => Some(Value::Float64(f64::from(*v))),
			other => integral(other).filter(|v| v.unsigned_abs() <= 1 << 53).map(|v| Value::Float64(v as f64)),
		},
		TypeTag::FixedString | TypeTag::VarString | TypeTag::WideFixedString | TypeTag::WideVarString => {
			match value {
				Value::Str(s) => Some(Value::Str(s.clone())),
				_ => None,
			}
		}
		TypeTag::Binary => match value {
			Value::Bytes(b) => Some(Value::Bytes(b.clone())),
			_ => None,
		},
		TypeTag::Guid => match value {
			Value::Uuid(u) => Some(Value::Uuid(*u)),
			Value::Str(s) => uuid::Uuid::parse_str(s.trim()).ok().map(Value::Uuid),
			_ => None,
		},
		TypeTag::Date => match value {
			Value::Date(d) => Some(Value::Date(*d)),
			Value::DateTime(dt) if is_midnight(dt) => Some(Value::Date(dt.date())),
			_ => None,
		},
		TypeTag::Timestamp => match value {
			Value::DateTime(dt) => Some(Value::DateTime(*dt)),
			Value::Date(d) => DateTime::from_parts(*d, 0, 0, 0, 0).map(Value::DateTime),
			_ => None,
		},
		TypeTag::Decimal {
			..
		} => match value {
			Value::Decimal(d) => Some(Value::Decimal(d.clone())),
			other => integral(other).map(|v| Value::Decimal(BigDecimal::from(v))),
		},
	}
}

fn limit(size: u64) -> Option<usize> {
	(size < UNBOUNDED_SIZE).then_some(size as usize)
}

/// Host bytes of a string under the string rules of `tag` and the declared `size`.
pub fn encode_text(tag: TypeTag, size: u64, text: &str) -> Vec<u8> {
	let limit = limit(size);
	if tag.is_wide() {
		let mut units: Vec<u16> = text.encode_utf16().collect();
		if let Some(limit) = limit {
			if units.len() > limit {
				units.truncate(limit);
				// a lone high surrogate would not decode
				if units.last().is_some_and(|u| (0xD800..0xDC00).contains(u)) {
					units.pop();
				}
			}
			if tag.is_padded() {
				units.resize(limit, 0x0020);
			}
		}
		return units.iter().flat_map(|u| u.to_le_bytes()).collect();
	}

	let mut end = text.len();
	if let Some(limit) = limit {
		end = end.min(limit);
		while !text.is_char_boundary(end) {
			end -= 1;
		}
	}
	let mut bytes = text.as_bytes()[..end].to_vec();
	if let Some(limit) = limit.filter(|_| tag.is_padded()) {
		bytes.resize(limit, b' ');
	}
	bytes
}

pub fn truncate_bytes(bytes: &[u8], size: u64) -> &[u8] {
	match limit(size) {
		Some(limit) if bytes.len() > limit => &bytes[..limit],
		_ => bytes,
	}
}

/// Host bytes of `value` as `tag`, `None` for a missing value.
///
/// Values of another native type are coerced when that is lossless and rejected with
/// `UnsupportedType` otherwise.
pub fn encode(tag: TypeTag, size: u64, value: &Value) -> Result<Option<Vec<u8>>> {
	if value.is_missing() {
		return Ok(None);
	}
	if let Value::Object {
		class,
	} = value
	{
		return Err(Error::unsupported(format!("runtime class '{class}'")));
	}
	let coerced = coerce(value, tag).ok_or_else(|| {
		Error::unsupported(format!("cannot convert {} value '{value}' to {tag}", value.native_type()))
	})?;

	let bytes = match (tag, &coerced) {
		(TypeTag::Boolean, Value::Bool(v)) => vec![u8::from(*v)],
		(TypeTag::UInt8, Value::UInt8(v)) => vec![*v],
		(TypeTag::Int16, Value::Int16(v)) => v.to_le_bytes().to_vec(),
		(TypeTag::Int32, Value::Int32(v)) => v.to_le_bytes().to_vec(),
		(TypeTag::Int64, Value::Int64(v)) => v.to_le_bytes().to_vec(),
		(TypeTag::Float32, Value::Float32(v)) => v.to_le_bytes().to_vec(),
		(TypeTag::Float64, Value::Float64(v)) => v.to_le_bytes().to_vec(),
		(tag, Value::Str(s)) if tag.is_string() => encode_text(tag, size, s),
		(TypeTag::Binary, Value::Bytes(b)) => truncate_bytes(b, size).to_vec(),
		(TypeTag::Guid, Value::Uuid(u)) => GuidStruct::from_uuid(u).to_bytes().to_vec(),
		(TypeTag::Date, Value::Date(d)) => DateStruct::from_date(d)?.to_bytes().to_vec(),
		(TypeTag::Timestamp, Value::DateTime(dt)) => TimestampStruct::from_datetime(dt)?.to_bytes().to_vec(),
		(
			TypeTag::Decimal {
				precision,
				scale,
			},
			Value::Decimal(d),
		) => NumericStruct::from_decimal(d, precision, scale)?.to_bytes().to_vec(),
		(tag, other) => return Err(Error::unsupported(format!("{} as {tag}", other.native_type()))),
	};
	Ok(Some(bytes))
}

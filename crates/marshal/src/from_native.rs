// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use bigdecimal::BigDecimal;
use bumpalo::{Bump, collections::Vec as BumpVec};
use langbridge_abi::{constants::SQL_NULL_DATA, data::ColumnBuffer};
use langbridge_runtime::{ColumnData, NativeColumn};
use langbridge_type::{
	Error, Result, TypeTag, Value, native_to_host,
	tag::MAX_DECIMAL_PRECISION,
	wire::NumericStruct,
};
use tracing::{instrument, warn};

use crate::{arena, descriptor::OutputColumn, scalar};

/// The host tag a runtime column is returned as.
pub fn output_tag(column: &NativeColumn<'_>) -> Result<TypeTag> {
	reject_objects(column)?;
	native_to_host(&column.native_type())
		.map_err(|err| Error::unsupported(format!("column '{}': {err}", column.name)))
}

fn reject_objects(column: &NativeColumn<'_>) -> Result<()> {
	if let ColumnData::Objects(values) = &column.data {
		for value in values {
			if let Value::Object {
				class,
			} = value
			{
				return Err(Error::unsupported(format!(
					"column '{}' holds a value of runtime class '{class}'",
					column.name
				)));
			}
		}
	}
	Ok(())
}

/// Rows that could not be converted without loss; they travel as NULL.
#[derive(Default)]
struct Rejected {
	count: usize,
	first: Option<String>,
}

impl Rejected {
	fn record(&mut self, row: usize, value: &Value, tag: TypeTag) {
		self.count += 1;
		if self.first.is_none() {
			self.first = Some(format!("row {row}: {} value '{value}' as {tag}", value.native_type()));
		}
	}

	fn report(&self, column: &str) {
		if let Some(first) = &self.first {
			warn!(column, rows = self.count, first = %first, "values could not be converted and were returned as NULL");
		}
	}
}

/// Converts a runtime column for the host as `tag`.
///
/// Every row gets an indicator. Missing values (`None`, NaN, infinities, `NaT`) become NULL, as
/// do values that cannot be coerced to `tag` without loss. The reported size of strings and
/// binary is the longest value, at least one character; decimals derive their precision and
/// scale from the data.
#[instrument(name = "marshal::from_native", level = "trace", skip_all, fields(column = %column.name, tag = %tag, rows = column.len()))]
pub fn from_native(column: &NativeColumn<'_>, tag: TypeTag) -> Result<OutputColumn> {
	reject_objects(column)?;
	arena::scoped("from_native", |bump| match tag {
		TypeTag::FixedString
		| TypeTag::VarString
		| TypeTag::WideFixedString
		| TypeTag::WideVarString
		| TypeTag::Binary => variable(column, tag, bump),
		TypeTag::Decimal {
			..
		} => decimal(column),
		_ => fixed(column, tag),
	})
}

fn pack<T: Copy, const N: usize>(
	values: &[T],
	to_bytes: impl Fn(T) -> [u8; N],
	is_missing: impl Fn(T) -> bool,
) -> (ColumnBuffer, bool) {
	let mut buffer = ColumnBuffer::with_capacity(values.len() * N, values.len());
	let mut nullable = false;
	for &value in values {
		if is_missing(value) {
			buffer.data.extend_from_slice(&[0u8; N]);
			buffer.indicators.push(SQL_NULL_DATA);
			nullable = true;
		} else {
			buffer.data.extend_from_slice(&to_bytes(value));
			buffer.indicators.push(N as i32);
		}
	}
	(buffer, nullable)
}

fn fixed(column: &NativeColumn<'_>, tag: TypeTag) -> Result<OutputColumn> {
	let width = tag.fixed_width().ok_or_else(|| Error::unsupported(format!("{tag} is not fixed-width")))?;

	let packed = match (&column.data, tag) {
		(ColumnData::UInt8(v), TypeTag::UInt8) => Some(pack(&v[..], |x: u8| [x], |_| false)),
		(ColumnData::Int16(v), TypeTag::Int16) => Some(pack(&v[..], i16::to_le_bytes, |_| false)),
		(ColumnData::Int32(v), TypeTag::Int32) => Some(pack(&v[..], i32::to_le_bytes, |_| false)),
		(ColumnData::Int64(v), TypeTag::Int64) => Some(pack(&v[..], i64::to_le_bytes, |_| false)),
		(ColumnData::Float32(v), TypeTag::Float32) => Some(pack(&v[..], f32::to_le_bytes, |x: f32| !x.is_finite())),
		(ColumnData::Float64(v), TypeTag::Float64) => Some(pack(&v[..], f64::to_le_bytes, |x: f64| !x.is_finite())),
		_ => None,
	};
	if let Some((buffer, nullable)) = packed {
		return Ok(OutputColumn {
			name: column.name.clone(),
			tag,
			size: width as u64,
			decimal_digits: 0,
			nullable,
			buffer,
		});
	}

	let rows = column.len();
	let mut buffer = ColumnBuffer::with_capacity(rows * width, rows);
	let mut nullable = false;
	let mut sub_second = false;
	let mut rejected = Rejected::default();

	for row in 0..rows {
		let value = column.get(row);
		let encoded = match scalar::encode(tag, width as u64, &value) {
			Ok(encoded) => encoded,
			Err(_) => {
				rejected.record(row, &value, tag);
				None
			}
		};
		match encoded {
			Some(bytes) => {
				if let Some(Value::DateTime(dt)) = scalar::coerce(&value, tag) {
					sub_second |= dt.microsecond() != 0;
				}
				buffer.data.extend_from_slice(&bytes);
				buffer.indicators.push(width as i32);
			}
			None => {
				buffer.data.extend(std::iter::repeat_n(0u8, width));
				buffer.indicators.push(SQL_NULL_DATA);
				nullable = true;
			}
		}
	}
	rejected.report(&column.name);

	Ok(OutputColumn {
		name: column.name.clone(),
		tag,
		size: width as u64,
		decimal_digits: if tag == TypeTag::Timestamp && sub_second {
			6
		} else {
			0
		},
		nullable,
		buffer,
	})
}

fn variable(column: &NativeColumn<'_>, tag: TypeTag, bump: &Bump) -> Result<OutputColumn> {
	let rows = column.len();
	let unit = tag.char_width();
	let mut encoded: BumpVec<Option<&[u8]>> = BumpVec::with_capacity_in(rows, bump);
	let mut rejected = Rejected::default();

	// pass 1: encode every row and find the widest
	let mut max_len = 0usize;
	for row in 0..rows {
		let value = column.get(row);
		if value.is_missing() {
			encoded.push(None);
			continue;
		}
		let bytes: &[u8] = match scalar::coerce(&value, tag) {
			Some(Value::Str(s)) if tag.is_wide() => {
				let mut wide = BumpVec::with_capacity_in(s.len() * 2, bump);
				wide.extend(s.encode_utf16().flat_map(u16::to_le_bytes));
				wide.into_bump_slice()
			}
			Some(Value::Str(s)) => bump.alloc_slice_copy(s.as_bytes()),
			Some(Value::Bytes(b)) => bump.alloc_slice_copy(&b),
			_ => {
				rejected.record(row, &value, tag);
				encoded.push(None);
				continue;
			}
		};
		max_len = max_len.max(bytes.len());
		encoded.push(Some(bytes));
	}
	rejected.report(&column.name);

	let width = max_len.max(unit);
	let pad: &[u8] = if tag.is_wide() {
		&[0x20, 0x00]
	} else {
		b" "
	};

	// pass 2: pack at running offsets
	let total = if tag.is_padded() {
		width * rows
	} else {
		encoded.iter().flatten().map(|b| b.len()).sum()
	};
	let mut buffer = ColumnBuffer::with_capacity(total, rows);
	let mut nullable = false;
	for row in encoded.iter() {
		match row {
			Some(bytes) => {
				let start = buffer.data.len();
				buffer.data.extend_from_slice(bytes);
				if tag.is_padded() {
					while buffer.data.len() - start < width {
						buffer.data.extend_from_slice(pad);
					}
				}
				buffer.indicators.push((buffer.data.len() - start) as i32);
			}
			None => {
				buffer.indicators.push(SQL_NULL_DATA);
				nullable = true;
			}
		}
	}

	Ok(OutputColumn {
		name: column.name.clone(),
		tag,
		size: (width / unit) as u64,
		decimal_digits: 0,
		nullable,
		buffer,
	})
}

fn decimal(column: &NativeColumn<'_>) -> Result<OutputColumn> {
	let placeholder = TypeTag::Decimal {
		precision: MAX_DECIMAL_PRECISION,
		scale: 0,
	};
	let mut rejected = Rejected::default();
	let values: Vec<Option<BigDecimal>> = column
		.values()
		.enumerate()
		.map(|(row, value)| {
			if value.is_missing() {
				return None;
			}
			match scalar::coerce(&value, placeholder) {
				Some(Value::Decimal(d)) => Some(d),
				_ => {
					rejected.record(row, &value, placeholder);
					None
				}
			}
		})
		.collect();
	rejected.report(&column.name);

	let scale = values
		.iter()
		.flatten()
		.map(|d| d.as_bigint_and_exponent().1.clamp(0, MAX_DECIMAL_PRECISION as i64))
		.max()
		.unwrap_or(0);
	let digits = values.iter().flatten().map(|d| d.with_scale(scale).digits()).max().unwrap_or(1);
	let precision = digits.max(scale as u64).clamp(1, MAX_DECIMAL_PRECISION as u64) as u8;
	let scale = scale as i8;

	let rows = values.len();
	let mut buffer = ColumnBuffer::with_capacity(rows * NumericStruct::SIZE, rows);
	let mut nullable = false;
	for value in &values {
		match value {
			Some(d) => {
				let numeric = NumericStruct::from_decimal(d, precision, scale)
					.map_err(|err| Error::unsupported(format!("column '{}': {err}", column.name)))?;
				buffer.data.extend_from_slice(&numeric.to_bytes());
				buffer.indicators.push(NumericStruct::SIZE as i32);
			}
			None => {
				buffer.data.extend_from_slice(&[0u8; NumericStruct::SIZE]);
				buffer.indicators.push(SQL_NULL_DATA);
				nullable = true;
			}
		}
	}

	Ok(OutputColumn {
		name: column.name.clone(),
		tag: TypeTag::Decimal {
			precision,
			scale,
		},
		size: precision as u64,
		decimal_digits: scale as i16,
		nullable,
		buffer,
	})
}

#[cfg(test)]
pub mod tests {
	use std::{borrow::Cow, str::FromStr};

	use langbridge_testing::column::{read_fixed, read_strings, read_wide_strings};
	use langbridge_type::{Date, DateTime, ErrorKind};

	use super::*;

	fn objects(name: &str, values: Vec<Value>) -> NativeColumn<'static> {
		NativeColumn::new(name, values)
	}

	#[test]
	fn test_typed_int_column() {
		let column = NativeColumn::new("x", vec![1i32, 2, 3]);
		let out = from_native(&column, TypeTag::Int32).unwrap();
		assert_eq!(out.size, 4);
		assert!(!out.nullable);
		assert_eq!(read_fixed::<i32>(&out.buffer), vec![Some(1), Some(2), Some(3)]);
	}

	#[test]
	fn test_nan_becomes_null() {
		let column = NativeColumn::new("x", vec![1.5f64, f64::NAN, f64::INFINITY]);
		let out = from_native(&column, TypeTag::Float64).unwrap();
		assert!(out.nullable);
		assert_eq!(out.buffer.indicators, vec![8, SQL_NULL_DATA, SQL_NULL_DATA]);
		assert_eq!(out.buffer.data.len(), 24);
	}

	#[test]
	fn test_boxed_ints_with_missing_rows() {
		let column = objects("x", vec![Value::Int32(10), Value::None, Value::Int32(30)]);
		let tag = output_tag(&column).unwrap();
		assert_eq!(tag, TypeTag::Int32);
		let out = from_native(&column, tag).unwrap();
		assert_eq!(out.buffer.indicators, vec![4, SQL_NULL_DATA, 4]);
		assert_eq!(read_fixed::<i32>(&out.buffer), vec![Some(10), None, Some(30)]);
	}

	#[test]
	fn test_lossy_values_become_null() {
		let column = objects("x", vec![Value::Int32(1), Value::str("two"), Value::Int64(1 << 40)]);
		let out = from_native(&column, TypeTag::Int32).unwrap();
		assert_eq!(read_fixed::<i32>(&out.buffer), vec![Some(1), None, None]);
		assert!(out.nullable);
	}

	#[test]
	fn test_lossless_values_are_coerced() {
		let column = objects("x", vec![Value::Int64(5), Value::Float64(6.0), Value::Bool(true)]);
		let out = from_native(&column, TypeTag::Int32).unwrap();
		assert_eq!(read_fixed::<i32>(&out.buffer), vec![Some(5), Some(6), Some(1)]);
	}

	#[test]
	fn test_strings_report_longest_value() {
		let column = objects("s", vec![Value::str("abc"), Value::None, Value::str("hello")]);
		let out = from_native(&column, TypeTag::VarString).unwrap();
		assert_eq!(out.size, 5);
		assert!(out.nullable);
		assert_eq!(out.buffer.indicators, vec![3, SQL_NULL_DATA, 5]);
		assert_eq!(read_strings(&out.buffer), vec![Some("abc".into()), None, Some("hello".into())]);
	}

	#[test]
	fn test_fixed_strings_pad_to_longest() {
		let column = objects("s", vec![Value::str("ab"), Value::str("abcd")]);
		let out = from_native(&column, TypeTag::FixedString).unwrap();
		assert_eq!(out.size, 4);
		assert_eq!(read_strings(&out.buffer), vec![Some("ab  ".into()), Some("abcd".into())]);
	}

	#[test]
	fn test_wide_strings_count_units() {
		let column = objects("w", vec![Value::str("日本語"), Value::str("a")]);
		let out = from_native(&column, TypeTag::WideVarString).unwrap();
		assert_eq!(out.size, 3);
		assert_eq!(out.buffer.indicators, vec![6, 2]);
		assert_eq!(read_wide_strings(&out.buffer), vec![Some("日本語".into()), Some("a".into())]);
	}

	#[test]
	fn test_empty_strings_report_width_one() {
		let column = objects("s", vec![Value::str(""), Value::str("")]);
		let out = from_native(&column, TypeTag::VarString).unwrap();
		assert_eq!(out.size, 1);
		assert!(!out.nullable);
		assert_eq!(out.buffer.indicators, vec![0, 0]);
	}

	#[test]
	fn test_all_missing_column_is_fixed_string_of_width_one() {
		let column = objects("nothing", vec![Value::None, Value::None]);
		let tag = output_tag(&column).unwrap();
		assert_eq!(tag, TypeTag::FixedString);
		let out = from_native(&column, tag).unwrap();
		assert_eq!(out.size, 1);
		assert!(out.nullable);
		assert_eq!(out.buffer.indicators, vec![SQL_NULL_DATA, SQL_NULL_DATA]);
	}

	#[test]
	fn test_object_values_are_unsupported() {
		let column = objects("frame", vec![Value::Int32(1), Value::object("DataFrame")]);
		let err = output_tag(&column).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UnsupportedType);
		assert!(err.to_string().contains("'frame'"));
		assert!(from_native(&column, TypeTag::Int32).is_err());
	}

	#[test]
	fn test_decimal_metadata_follows_data() {
		let column = objects(
			"d",
			vec![
				Value::Decimal(BigDecimal::from_str("1.5").unwrap()),
				Value::Decimal(BigDecimal::from_str("-1234.125").unwrap()),
				Value::None,
			],
		);
		let tag = output_tag(&column).unwrap();
		let out = from_native(&column, tag).unwrap();
		assert_eq!(
			out.tag,
			TypeTag::Decimal {
				precision: 7,
				scale: 3
			}
		);
		assert_eq!(out.size, 7);
		assert_eq!(out.decimal_digits, 3);
		assert!(out.nullable);

		let second = NumericStruct::from_bytes(&out.buffer.data[NumericStruct::SIZE..]).unwrap();
		assert_eq!(second.sign, 0);
		assert_eq!(second.to_decimal(3), BigDecimal::from_str("-1234.125").unwrap());
	}

	#[test]
	fn test_timestamp_reports_sub_second_digits() {
		let date = Date::new(2023, 7, 1).unwrap();
		let whole = DateTime::from_parts(date, 8, 0, 0, 0).unwrap();
		let fractional = DateTime::from_parts(date, 8, 0, 0, 500).unwrap();

		let column = objects("t", vec![Value::DateTime(whole), Value::NaT]);
		let out = from_native(&column, TypeTag::Timestamp).unwrap();
		assert_eq!(out.decimal_digits, 0);
		assert_eq!(out.buffer.indicators, vec![16, SQL_NULL_DATA]);

		let column = objects("t", vec![Value::DateTime(whole), Value::DateTime(fractional)]);
		let out = from_native(&column, TypeTag::Timestamp).unwrap();
		assert_eq!(out.decimal_digits, 6);
	}

	#[test]
	fn test_borrowed_bool_view() {
		let bytes = [1u8, 0, b'0'];
		let column = NativeColumn::new("b", ColumnData::Bool(Cow::Borrowed(&bytes)));
		let out = from_native(&column, TypeTag::Boolean).unwrap();
		assert_eq!(out.buffer.data, vec![1, 0, 0]);
	}
}

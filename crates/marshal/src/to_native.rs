// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use bumpalo::{Bump, collections::Vec as BumpVec};
use langbridge_abi::data::ColumnSlice;
use langbridge_runtime::{ColumnData, NativeColumn};
use langbridge_type::{Error, Result, TypeTag, Value};
use tracing::instrument;

use crate::{
	arena,
	descriptor::ColumnDescriptor,
	scalar::{self, decode_narrow},
};

/// Presents one host column to the runtime.
///
/// Numeric and boolean columns become views over the host buffer unless the column is nullable
/// and holds NULL rows; everything else is materialized as one boxed value per row with
/// [`Value::None`] for NULL rows. Indicators of a non-nullable numeric column are not consulted.
#[instrument(name = "marshal::to_native", level = "trace", skip_all, fields(column = %descriptor.name, tag = %descriptor.tag, rows = slice.row_count))]
pub fn to_native<'a>(descriptor: &ColumnDescriptor, slice: ColumnSlice<'a>) -> Result<NativeColumn<'a>> {
	let tag = descriptor.tag;
	let data = match tag {
		TypeTag::Boolean
		| TypeTag::UInt8
		| TypeTag::Int16
		| TypeTag::Int32
		| TypeTag::Int64
		| TypeTag::Float32
		| TypeTag::Float64
			if descriptor.nullable && slice.has_nulls() =>
		{
			ColumnData::Objects(fixed_rows(tag, &slice)?)
		}
		TypeTag::Boolean => ColumnData::Bool(slice.typed::<u8>()?),
		TypeTag::UInt8 => ColumnData::UInt8(slice.typed::<u8>()?),
		TypeTag::Int16 => ColumnData::Int16(slice.typed::<i16>()?),
		TypeTag::Int32 => ColumnData::Int32(slice.typed::<i32>()?),
		TypeTag::Int64 => ColumnData::Int64(slice.typed::<i64>()?),
		TypeTag::Float32 => ColumnData::Float32(slice.typed::<f32>()?),
		TypeTag::Float64 => ColumnData::Float64(slice.typed::<f64>()?),
		TypeTag::Guid
		| TypeTag::Date
		| TypeTag::Timestamp
		| TypeTag::Decimal {
			..
		} => ColumnData::Objects(fixed_rows(tag, &slice)?),
		TypeTag::FixedString
		| TypeTag::VarString
		| TypeTag::WideFixedString
		| TypeTag::WideVarString
		| TypeTag::Binary => ColumnData::Objects(arena::scoped("to_native", |bump| variable_rows(tag, &slice, bump))?),
	};

	Ok(NativeColumn::new(descriptor.name.clone(), data))
}

fn fixed_rows(tag: TypeTag, slice: &ColumnSlice<'_>) -> Result<Vec<Value>> {
	let width = tag.fixed_width().ok_or_else(|| Error::unsupported(format!("{tag} is not fixed-width")))?;
	let mut values = Vec::with_capacity(slice.row_count);
	for row in 0..slice.row_count {
		if slice.is_null(row) {
			values.push(Value::None);
		} else {
			values.push(scalar::decode(tag, slice.fixed(row, width)?)?);
		}
	}
	Ok(values)
}

fn variable_rows(tag: TypeTag, slice: &ColumnSlice<'_>, bump: &Bump) -> Result<Vec<Value>> {
	let mut values = Vec::with_capacity(slice.row_count);
	let mut units = BumpVec::new_in(bump);
	for row in slice.variable_rows() {
		let Some(bytes) = row? else {
			values.push(Value::None);
			continue;
		};
		let value = match tag {
			TypeTag::Binary => Value::Bytes(bytes.to_vec()),
			TypeTag::WideFixedString | TypeTag::WideVarString => {
				if bytes.len() % 2 != 0 {
					return Err(Error::malformed(format!("wide string of odd length {}", bytes.len())));
				}
				units.clear();
				units.extend(bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])));
				Value::Str(String::from_utf16(&units).map_err(|_| Error::malformed("invalid UTF-16"))?)
			}
			_ => Value::Str(decode_narrow(bytes)?.to_string()),
		};
		values.push(value);
	}
	Ok(values)
}

#[cfg(test)]
pub mod tests {
	use std::{borrow::Cow, str::FromStr};

	use bigdecimal::BigDecimal;
	use langbridge_testing::column::{
		binary_column, fixed_column, int32_column, string_column, struct_column, wide_string_column,
	};
	use langbridge_type::{
		Date, DateTime, ErrorKind,
		wire::{DateStruct, NumericStruct, TimestampStruct},
	};

	use super::*;

	#[test]
	fn test_int_column_without_nulls_is_a_view() {
		let buffer = int32_column(&[Some(1), Some(2), Some(3)]);
		let column = to_native(&ColumnDescriptor::new(0, "x", TypeTag::Int32, 4), buffer.as_slice()).unwrap();
		assert!(column.is_borrowed());
		assert_eq!(column.data, ColumnData::Int32(Cow::Owned(vec![1, 2, 3])));
	}

	#[test]
	fn test_int_column_with_nulls_is_boxed() {
		let buffer = int32_column(&[Some(10), None, Some(30)]);
		assert_eq!(buffer.indicators, vec![4, -1, 4]);
		let column = to_native(&ColumnDescriptor::new(0, "x", TypeTag::Int32, 4), buffer.as_slice()).unwrap();
		assert_eq!(column.data, ColumnData::Objects(vec![Value::Int32(10), Value::None, Value::Int32(30)]));
	}

	#[test]
	fn test_non_nullable_int_column_stays_a_view() {
		let buffer = int32_column(&[Some(10), None, Some(30)]);
		let mut descriptor = ColumnDescriptor::new(0, "x", TypeTag::Int32, 4);
		descriptor.nullable = false;
		let column = to_native(&descriptor, buffer.as_slice()).unwrap();
		assert!(column.is_borrowed());
		assert_eq!(column.data, ColumnData::Int32(Cow::Owned(vec![10, 0, 30])));
	}

	#[test]
	fn test_strings_decode_rows_and_nulls() {
		let buffer = string_column(&[Some("héllo"), None, Some("")]);
		let column =
			to_native(&ColumnDescriptor::new(0, "s", TypeTag::VarString, 10), buffer.as_slice()).unwrap();
		assert_eq!(column.data, ColumnData::Objects(vec![Value::str("héllo"), Value::None, Value::str("")]));
	}

	#[test]
	fn test_wide_strings() {
		let buffer = wide_string_column(&[Some("日本"), None]);
		let column =
			to_native(&ColumnDescriptor::new(0, "w", TypeTag::WideVarString, 10), buffer.as_slice()).unwrap();
		assert_eq!(column.data, ColumnData::Objects(vec![Value::str("日本"), Value::None]));
	}

	#[test]
	fn test_binary() {
		let buffer = binary_column(&[Some(&[1u8, 2][..]), None]);
		let column = to_native(&ColumnDescriptor::new(0, "b", TypeTag::Binary, 8), buffer.as_slice()).unwrap();
		assert_eq!(column.get(0), Value::Bytes(vec![1, 2]));
		assert_eq!(column.get(1), Value::None);
	}

	#[test]
	fn test_invalid_utf8_is_malformed() {
		let buffer = binary_column(&[Some(&[0xc3, 0x28][..])]);
		let err = to_native(&ColumnDescriptor::new(0, "s", TypeTag::VarString, 8), buffer.as_slice()).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::MalformedBuffer);
	}

	#[test]
	fn test_dates_and_timestamps() {
		let date = DateStruct {
			year: 2024,
			month: 2,
			day: 29,
		};
		let buffer = struct_column(DateStruct::SIZE, &[Some(date.to_bytes().to_vec()), None]);
		let column = to_native(&ColumnDescriptor::new(0, "d", TypeTag::Date, 6), buffer.as_slice()).unwrap();
		assert_eq!(column.get(0), Value::Date(Date::new(2024, 2, 29).unwrap()));
		assert_eq!(column.get(1), Value::None);

		let ts = TimestampStruct {
			year: 2024,
			month: 2,
			day: 29,
			hour: 12,
			minute: 30,
			second: 15,
			fraction: 250_000_999,
		};
		let buffer = struct_column(TimestampStruct::SIZE, &[Some(ts.to_bytes().to_vec())]);
		let column = to_native(&ColumnDescriptor::new(0, "t", TypeTag::Timestamp, 16), buffer.as_slice()).unwrap();
		let expected = DateTime::from_parts(Date::new(2024, 2, 29).unwrap(), 12, 30, 15, 250_000).unwrap();
		assert_eq!(column.get(0), Value::DateTime(expected));
	}

	#[test]
	fn test_decimal_uses_declared_scale() {
		let tag = TypeTag::Decimal {
			precision: 10,
			scale: 2,
		};
		let numeric = NumericStruct::from_decimal(&BigDecimal::from_str("-123.45").unwrap(), 10, 2).unwrap();
		let buffer = struct_column(NumericStruct::SIZE, &[Some(numeric.to_bytes().to_vec())]);
		let column = to_native(&ColumnDescriptor::new(0, "n", tag, 10), buffer.as_slice()).unwrap();
		assert_eq!(column.get(0), Value::Decimal(BigDecimal::from_str("-123.45").unwrap()));
	}

	#[test]
	fn test_bool_bytes() {
		let buffer = fixed_column(&[Some(b'0'), Some(1u8), None]);
		let column = to_native(&ColumnDescriptor::new(0, "b", TypeTag::Boolean, 1), buffer.as_slice()).unwrap();
		assert_eq!(column.data, ColumnData::Objects(vec![Value::Bool(false), Value::Bool(true), Value::None]));
	}
}

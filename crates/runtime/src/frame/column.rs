// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{borrow::Cow, ops::Deref};

use langbridge_type::{NativeType, Value, wire::is_bit_true};

/// Values of one native column.
///
/// The typed variants are views over host buffers (borrowed) or runtime-produced arrays (owned)
/// and cannot hold missing values; a column with missing rows is `Objects`.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData<'a> {
	/// Host boolean bytes; see [`is_bit_true`]
	Bool(Cow<'a, [u8]>),
	UInt8(Cow<'a, [u8]>),
	Int16(Cow<'a, [i16]>),
	Int32(Cow<'a, [i32]>),
	Int64(Cow<'a, [i64]>),
	Float32(Cow<'a, [f32]>),
	Float64(Cow<'a, [f64]>),
	/// One boxed value per row
	Objects(Vec<Value>),
}

impl<'a> ColumnData<'a> {
	pub fn len(&self) -> usize {
		match self {
			ColumnData::Bool(v) | ColumnData::UInt8(v) => v.len(),
			ColumnData::Int16(v) => v.len(),
			ColumnData::Int32(v) => v.len(),
			ColumnData::Int64(v) => v.len(),
			ColumnData::Float32(v) => v.len(),
			ColumnData::Float64(v) => v.len(),
			ColumnData::Objects(v) => v.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// True when the column is a view directly over a host buffer.
	pub fn is_borrowed(&self) -> bool {
		match self {
			ColumnData::Bool(v) | ColumnData::UInt8(v) => matches!(v, Cow::Borrowed(_)),
			ColumnData::Int16(v) => matches!(v, Cow::Borrowed(_)),
			ColumnData::Int32(v) => matches!(v, Cow::Borrowed(_)),
			ColumnData::Int64(v) => matches!(v, Cow::Borrowed(_)),
			ColumnData::Float32(v) => matches!(v, Cow::Borrowed(_)),
			ColumnData::Float64(v) => matches!(v, Cow::Borrowed(_)),
			ColumnData::Objects(_) => false,
		}
	}

	pub fn get(&self, row: usize) -> Value {
		match self {
			ColumnData::Bool(v) => Value::Bool(is_bit_true(v[row])),
			ColumnData::UInt8(v) => Value::UInt8(v[row]),
			ColumnData::Int16(v) => Value::Int16(v[row]),
			ColumnData::Int32(v) => Value::Int32(v[row]),
			ColumnData::Int64(v) => Value::Int64(v[row]),
			ColumnData::Float32(v) => Value::Float32(v[row]),
			ColumnData::Float64(v) => Value::Float64(v[row]),
			ColumnData::Objects(v) => v[row].clone(),
		}
	}

	pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
		(0..self.len()).map(|row| self.get(row))
	}

	/// The column's native type: fixed for typed views, the type of the first present value for
	/// boxed columns, [`NativeType::None`] when every row is `None`.
	pub fn native_type(&self) -> NativeType {
		match self {
			ColumnData::Bool(_) => NativeType::Bool,
			ColumnData::UInt8(_) => NativeType::UInt8,
			ColumnData::Int16(_) => NativeType::Int16,
			ColumnData::Int32(_) => NativeType::Int32,
			ColumnData::Int64(_) => NativeType::Int64,
			ColumnData::Float32(_) => NativeType::Float32,
			ColumnData::Float64(_) => NativeType::Float64,
			ColumnData::Objects(values) => values
				.iter()
				.find(|v| !matches!(v, Value::None))
				.map(Value::native_type)
				.unwrap_or(NativeType::None),
		}
	}

	pub fn into_owned(self) -> ColumnData<'static> {
		match self {
			ColumnData::Bool(v) => ColumnData::Bool(Cow::Owned(v.into_owned())),
			ColumnData::UInt8(v) => ColumnData::UInt8(Cow::Owned(v.into_owned())),
			ColumnData::Int16(v) => ColumnData::Int16(Cow::Owned(v.into_owned())),
			ColumnData::Int32(v) => ColumnData::Int32(Cow::Owned(v.into_owned())),
			ColumnData::Int64(v) => ColumnData::Int64(Cow::Owned(v.into_owned())),
			ColumnData::Float32(v) => ColumnData::Float32(Cow::Owned(v.into_owned())),
			ColumnData::Float64(v) => ColumnData::Float64(Cow::Owned(v.into_owned())),
			ColumnData::Objects(v) => ColumnData::Objects(v),
		}
	}
}

impl From<Vec<Value>> for ColumnData<'static> {
	fn from(values: Vec<Value>) -> Self {
		ColumnData::Objects(values)
	}
}

impl From<Vec<i32>> for ColumnData<'static> {
	fn from(values: Vec<i32>) -> Self {
		ColumnData::Int32(Cow::Owned(values))
	}
}

impl From<Vec<i64>> for ColumnData<'static> {
	fn from(values: Vec<i64>) -> Self {
		ColumnData::Int64(Cow::Owned(values))
	}
}

impl From<Vec<f64>> for ColumnData<'static> {
	fn from(values: Vec<f64>) -> Self {
		ColumnData::Float64(Cow::Owned(values))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NativeColumn<'a> {
	pub name: String,
	pub data: ColumnData<'a>,
}

impl<'a> NativeColumn<'a> {
	pub fn new(name: impl Into<String>, data: impl Into<ColumnData<'a>>) -> Self {
		Self {
			name: name.into(),
			data: data.into(),
		}
	}

	pub fn into_owned(self) -> NativeColumn<'static> {
		NativeColumn {
			name: self.name,
			data: self.data.into_owned(),
		}
	}
}

impl<'a> Deref for NativeColumn<'a> {
	type Target = ColumnData<'a>;

	fn deref(&self) -> &Self::Target {
		&self.data
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_bool_view_uses_bit_truthiness() {
		let bytes = [0u8, 1, b'0', b'1'];
		let data = ColumnData::Bool(Cow::Borrowed(&bytes));
		let values: Vec<_> = data.values().collect();
		assert_eq!(values, vec![Value::Bool(false), Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
		assert!(data.is_borrowed());
	}

	#[test]
	fn test_native_type_of_objects_skips_leading_none() {
		let data = ColumnData::Objects(vec![Value::None, Value::str("a")]);
		assert_eq!(data.native_type(), NativeType::Str);

		let data = ColumnData::Objects(vec![Value::None, Value::None]);
		assert_eq!(data.native_type(), NativeType::None);

		let data = ColumnData::Objects(vec![Value::None, Value::NaT]);
		assert_eq!(data.native_type(), NativeType::DateTime);
	}

	#[test]
	fn test_into_owned_detaches_from_buffer() {
		let values = vec![1i32, 2, 3];
		let owned = {
			let data = ColumnData::Int32(Cow::Borrowed(&values));
			data.into_owned()
		};
		assert!(!owned.is_borrowed());
		assert_eq!(owned.get(2), Value::Int32(3));
	}
}

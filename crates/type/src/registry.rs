// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Mapping between host type tags and the embedded runtime's native types.

use std::{
	fmt,
	fmt::{Display, Formatter},
};

use crate::{Error, Result, TypeTag};

/// The embedded runtime's native kinds of value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
	None,
	Bool,
	UInt8,
	Int16,
	Int32,
	Int64,
	Float32,
	Float64,
	Str,
	Bytes,
	Uuid,
	Date,
	DateTime,
	Decimal,
	Object(String),
}

impl Display for NativeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			NativeType::None => f.write_str("none"),
			NativeType::Bool => f.write_str("bool"),
			NativeType::UInt8 => f.write_str("uint8"),
			NativeType::Int16 => f.write_str("int16"),
			NativeType::Int32 => f.write_str("int32"),
			NativeType::Int64 => f.write_str("int64"),
			NativeType::Float32 => f.write_str("float32"),
			NativeType::Float64 => f.write_str("float64"),
			NativeType::Str => f.write_str("str"),
			NativeType::Bytes => f.write_str("bytes"),
			NativeType::Uuid => f.write_str("uuid"),
			NativeType::Date => f.write_str("date"),
			NativeType::DateTime => f.write_str("datetime"),
			NativeType::Decimal => f.write_str("decimal"),
			NativeType::Object(class) => write!(f, "object<{class}>"),
		}
	}
}

/// The native type a host column or parameter of `tag` is presented as.
pub fn host_to_native(tag: TypeTag) -> NativeType {
	match tag {
		TypeTag::Boolean => NativeType::Bool,
		TypeTag::UInt8 => NativeType::UInt8,
		TypeTag::Int16 => NativeType::Int16,
		TypeTag::Int32 => NativeType::Int32,
		TypeTag::Int64 => NativeType::Int64,
		TypeTag::Float32 => NativeType::Float32,
		TypeTag::Float64 => NativeType::Float64,
		TypeTag::FixedString | TypeTag::VarString | TypeTag::WideFixedString | TypeTag::WideVarString => {
			NativeType::Str
		}
		TypeTag::Binary => NativeType::Bytes,
		TypeTag::Guid => NativeType::Uuid,
		TypeTag::Date => NativeType::Date,
		TypeTag::Timestamp => NativeType::DateTime,
		TypeTag::Decimal {
			..
		} => NativeType::Decimal,
	}
}

/// The host tag a native value of `native` is returned as.
///
/// Strings come back as narrow variable-length text and an all-missing column as a narrow
/// fixed-length one. Decimal precision and scale are placeholders here; the marshaler derives the
/// real ones from the data.
pub fn native_to_host(native: &NativeType) -> Result<TypeTag> {
	Ok(match native {
		NativeType::None => TypeTag::FixedString,
		NativeType::Bool => TypeTag::Boolean,
		NativeType::UInt8 => TypeTag::UInt8,
		NativeType::Int16 => TypeTag::Int16,
		NativeType::Int32 => TypeTag::Int32,
		NativeType::Int64 => TypeTag::Int64,
		NativeType::Float32 => TypeTag::Float32,
		NativeType::Float64 => TypeTag::Float64,
		NativeType::Str => TypeTag::VarString,
		NativeType::Bytes => TypeTag::Binary,
		NativeType::Uuid => TypeTag::Guid,
		NativeType::Date => TypeTag::Date,
		NativeType::DateTime => TypeTag::Timestamp,
		NativeType::Decimal => TypeTag::Decimal {
			precision: crate::tag::MAX_DECIMAL_PRECISION,
			scale: 0,
		},
		NativeType::Object(class) => return Err(Error::unsupported(format!("runtime class '{class}'"))),
	})
}

#[cfg(test)]
pub mod tests {
	use super::*;
	use crate::ErrorKind;

	#[test]
	fn test_every_tag_maps_back_to_its_family() {
		for tag in [
			TypeTag::Int16,
			TypeTag::Int32,
			TypeTag::Int64,
			TypeTag::UInt8,
			TypeTag::Boolean,
			TypeTag::Float32,
			TypeTag::Float64,
			TypeTag::Binary,
			TypeTag::Guid,
			TypeTag::Date,
			TypeTag::Timestamp,
		] {
			assert_eq!(native_to_host(&host_to_native(tag)).unwrap(), tag);
		}
	}

	#[test]
	fn test_strings_map_to_var_string() {
		for tag in [TypeTag::FixedString, TypeTag::VarString, TypeTag::WideFixedString, TypeTag::WideVarString] {
			assert_eq!(native_to_host(&host_to_native(tag)).unwrap(), TypeTag::VarString);
		}
	}

	#[test]
	fn test_none_maps_to_fixed_string() {
		assert_eq!(native_to_host(&NativeType::None).unwrap(), TypeTag::FixedString);
	}

	#[test]
	fn test_object_is_unsupported() {
		let err = native_to_host(&NativeType::Object("Widget".to_string())).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UnsupportedType);
		assert!(err.to_string().contains("Widget"));
	}
}

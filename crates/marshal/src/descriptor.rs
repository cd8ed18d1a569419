// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use langbridge_abi::data::ColumnBuffer;
use langbridge_type::{Result, TypeTag};
use serde::{Deserialize, Serialize};

/// An input column as declared by `InitColumn`. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
	pub id: u16,
	pub name: String,
	pub tag: TypeTag,
	/// Declared size: byte width, character count or decimal precision depending on the tag
	pub size: u64,
	pub decimal_digits: i16,
	pub nullable: bool,
	/// Recorded as given, never interpreted
	pub partition_idx: i16,
	/// Recorded as given, never interpreted
	pub order_idx: i16,
}

impl ColumnDescriptor {
	/// Resolves the host type code and builds the descriptor.
	pub fn from_host(
		id: u16,
		name: impl Into<String>,
		type_code: i16,
		size: u64,
		decimal_digits: i16,
		nullable: bool,
		partition_idx: i16,
		order_idx: i16,
	) -> Result<Self> {
		Ok(Self {
			id,
			name: name.into(),
			tag: TypeTag::from_code(type_code, size, decimal_digits)?,
			size,
			decimal_digits,
			nullable,
			partition_idx,
			order_idx,
		})
	}

	pub fn new(id: u16, name: impl Into<String>, tag: TypeTag, size: u64) -> Self {
		let decimal_digits = match tag {
			TypeTag::Decimal {
				scale,
				..
			} => scale as i16,
			_ => 0,
		};
		Self {
			id,
			name: name.into(),
			tag,
			size,
			decimal_digits,
			nullable: true,
			partition_idx: -1,
			order_idx: -1,
		}
	}
}

/// A column produced by the runtime, converted for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
	pub name: String,
	pub tag: TypeTag,
	/// Byte width for fixed types, longest value (bytes, or UTF-16 units for wide strings) for
	/// variable ones, precision for decimals
	pub size: u64,
	pub decimal_digits: i16,
	/// True iff at least one row is NULL
	pub nullable: bool,
	pub buffer: ColumnBuffer,
}

impl OutputColumn {
	pub fn row_count(&self) -> usize {
		self.buffer.row_count()
	}
}

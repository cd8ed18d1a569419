// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Native tables exchanged with the embedded runtime.

mod column;

use std::ops::{Deref, Index};

pub use column::{ColumnData, NativeColumn};
use indexmap::IndexMap;
use langbridge_type::Value;

/// Named values exposed to a script, in declaration order.
pub type ParamMap = IndexMap<String, Value>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame<'a> {
	pub columns: Vec<NativeColumn<'a>>,
}

impl<'a> Deref for Frame<'a> {
	type Target = [NativeColumn<'a>];

	fn deref(&self) -> &Self::Target {
		&self.columns
	}
}

impl<'a> Index<usize> for Frame<'a> {
	type Output = NativeColumn<'a>;

	fn index(&self, index: usize) -> &Self::Output {
		self.columns.index(index)
	}
}

impl<'a> Frame<'a> {
	pub fn new(columns: Vec<NativeColumn<'a>>) -> Self {
		Self {
			columns,
		}
	}

	pub fn row_count(&self) -> usize {
		self.columns.first().map_or(0, |c| c.len())
	}

	pub fn column(&self, name: &str) -> Option<&NativeColumn<'a>> {
		self.columns.iter().find(|c| c.name == name)
	}

	pub fn into_owned(self) -> Frame<'static> {
		Frame {
			columns: self.columns.into_iter().map(NativeColumn::into_owned).collect(),
		}
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_row_count_follows_first_column() {
		let frame = Frame::new(vec![
			NativeColumn::new("a", vec![1i32, 2, 3]),
			NativeColumn::new("b", vec![Value::None, Value::None, Value::None]),
		]);
		assert_eq!(frame.row_count(), 3);
		assert_eq!(frame.column("b").map(|c| c.len()), Some(3));
		assert!(frame.column("c").is_none());
	}

	#[test]
	fn test_empty_frame() {
		assert_eq!(Frame::default().row_count(), 0);
	}
}

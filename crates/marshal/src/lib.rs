// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Conversion between host buffers and native runtime values.
//!
//! Columns go through [`to_native`] and [`from_native`]; single values (parameters, boxed column
//! rows) through the [`scalar`] rules. Every column conversion scopes its scratch allocations in
//! an [`arena`].

pub mod arena;
pub mod descriptor;
mod from_native;
pub mod scalar;
mod to_native;

pub use descriptor::{ColumnDescriptor, OutputColumn};
pub use from_native::{from_native, output_tag};
pub use to_native::to_native;

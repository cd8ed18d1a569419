// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Closed type system shared by every langbridge component.
//!
//! Host columns and parameters are described by a [`TypeTag`]; the embedded runtime works with
//! [`Value`]s. The [`registry`] maps between the two, and [`wire`] holds the fixed binary layouts
//! of the struct-shaped host types (date, timestamp, numeric, guid).

pub mod error;
pub mod registry;
pub mod tag;
pub mod value;
pub mod wire;

pub use error::{Error, ErrorKind, Result};
pub use registry::{NativeType, host_to_native, native_to_host};
pub use tag::{TypeTag, UNBOUNDED_SIZE};
pub use value::{Date, DateTime, Value};

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The seam between the bridge and the embedded runtime.
//!
//! The bridge never talks to a runtime directly; it holds a [`RuntimeHandle`], which serializes
//! every call behind one lock and clears the runtime's error state whenever a call fails.

pub mod frame;
pub mod runtime;
pub mod script;

pub use frame::{ColumnData, Frame, NativeColumn, ParamMap};
pub use runtime::{Invocation, Outcome, Runtime, RuntimeHandle, UnitId};
pub use script::{ScriptRuntime, UnitContext, UnitRegistry};

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scalar parameters of a session.
//!
//! Parameters are deep copies of host values, addressed by dense ids and by their
//! marker-stripped names. Output parameters are read back from the runtime's parameter map after
//! an execution.

mod container;
mod parameter;

pub use container::ParamContainer;
pub use parameter::{ParamDeclaration, Parameter, strip_marker};

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Host column buffers and indicator arrays

mod column;
mod pointers;

pub use column::*;
pub use pointers::ResultPointers;

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Integer and pointer types of the C call surface, named after their host counterparts

use std::ffi::c_void;

pub type SqlReturn = i16;
pub type SqlChar = u8;
pub type SqlSmallInt = i16;
pub type SqlUSmallInt = u16;
pub type SqlInteger = i32;
pub type SqlULen = u64;
pub type SqlPointer = *mut c_void;

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! C ABI definitions for the langbridge call surface
//!
//! This crate provides the FFI-safe types the host passes across the boundary (session GUIDs,
//! parameter direction codes, column buffers with indicator arrays) together with safe views over
//! them.

pub mod constants;
pub mod data;
pub mod param;
pub mod session;
pub mod types;

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Session protocol for the langbridge extension.
//!
//! An [`Extension`] owns the runtime handle, the library manager and every open [`Session`]. A
//! session walks `Open → SchemaBound → Executed`, accepting column and parameter declarations,
//! running batches through the runtime and exposing the results until it is cleaned up.

pub mod config;
mod extension;
mod session;
mod state;

pub use config::ExtensionConfig;
pub use extension::Extension;
pub use session::{Session, SessionSpec};
pub use state::SessionState;

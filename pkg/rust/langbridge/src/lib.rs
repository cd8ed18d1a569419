// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The C call surface of the langbridge language extension.
//!
//! Every exported function catches all failures, panics included, logs them and answers
//! `SQL_SUCCESS` or `SQL_ERROR`. Session calls go to the single process-wide [`Extension`]
//! created by `Init`; library calls work with or without it.

mod boundary;
mod global;
mod host;
mod library;
mod protocol;

pub use global::register_units;
pub use langbridge_session::Extension;
pub use library::{InstallExternalLibrary, UninstallExternalLibrary};
pub use protocol::{
	Cleanup, CleanupSession, Execute, GetInterfaceVersion, GetOutputParam, GetResultColumn, GetResults, Init,
	InitColumn, InitParam, InitSession,
};

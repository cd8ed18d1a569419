// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

/// Where a session is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
	/// Script bound, input columns still being declared
	Open,
	/// Every input column declared; parameters may still arrive
	SchemaBound,
	/// At least one batch ran and its results are readable
	Executed,
}

impl SessionState {
	pub fn can_execute(&self) -> bool {
		!matches!(self, SessionState::Open)
	}

	pub fn has_results(&self) -> bool {
		matches!(self, SessionState::Executed)
	}
}

impl Display for SessionState {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			SessionState::Open => f.write_str("open"),
			SessionState::SchemaBound => f.write_str("schema bound"),
			SessionState::Executed => f.write_str("executed"),
		}
	}
}

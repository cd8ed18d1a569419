// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The host's `SQLGUID`, passed by value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SqlGuid {
	pub data1: u32,
	pub data2: u16,
	pub data3: u16,
	pub data4: [u8; 8],
}

/// Opaque 128-bit session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for SessionId {
	fn default() -> Self {
		Self::new()
	}
}

impl From<SqlGuid> for SessionId {
	fn from(guid: SqlGuid) -> Self {
		Self(Uuid::from_fields(guid.data1, guid.data2, guid.data3, &guid.data4))
	}
}

impl From<SessionId> for SqlGuid {
	fn from(id: SessionId) -> Self {
		let (data1, data2, data3, data4) = id.0.as_fields();
		Self {
			data1,
			data2,
			data3,
			data4: *data4,
		}
	}
}

impl Display for SessionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.hyphenated())
	}
}

/// Sessions are keyed by the session token together with the task (partition) id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
	pub id: SessionId,
	pub task_id: u16,
}

impl SessionKey {
	pub fn new(id: SessionId, task_id: u16) -> Self {
		Self {
			id,
			task_id,
		}
	}
}

impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.id, self.task_id)
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	path::{Path, PathBuf},
};

use langbridge_type::Result;
use serde::{Deserialize, Serialize};

use crate::installation::LibraryInstallation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
	Public,
	Private,
}

impl Display for Scope {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Scope::Public => f.write_str("public"),
			Scope::Private => f.write_str("private"),
		}
	}
}

/// Package roots the runtime searches, private before public.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPath {
	pub private: Option<PathBuf>,
	pub public: Option<PathBuf>,
}

impl SearchPath {
	pub fn new(private: Option<PathBuf>, public: Option<PathBuf>) -> Self {
		Self {
			private,
			public,
		}
	}

	/// Configured roots in search order.
	pub fn roots(&self) -> impl Iterator<Item = (Scope, &Path)> {
		[(Scope::Private, self.private.as_deref()), (Scope::Public, self.public.as_deref())]
			.into_iter()
			.filter_map(|(scope, root)| root.map(|r| (scope, r)))
	}

	pub fn root(&self, scope: Scope) -> Option<&Path> {
		match scope {
			Scope::Private => self.private.as_deref(),
			Scope::Public => self.public.as_deref(),
		}
	}

	/// The installation of `name` the runtime would load: the first scope holding one wins.
	pub fn find(&self, name: &str) -> Result<Option<LibraryInstallation>> {
		for (scope, root) in self.roots() {
			if let Some(installation) = LibraryInstallation::find(root, name, scope)? {
				return Ok(Some(installation));
			}
		}
		Ok(None)
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_private_root_comes_first() {
		let path = SearchPath::new(Some("/lib/private".into()), Some("/lib/public".into()));
		let roots: Vec<_> = path.roots().collect();
		assert_eq!(roots, vec![(Scope::Private, Path::new("/lib/private")), (Scope::Public, Path::new("/lib/public"))]);
	}

	#[test]
	fn test_missing_roots_are_skipped() {
		let path = SearchPath::new(None, Some("/lib/public".into()));
		let roots: Vec<_> = path.roots().collect();
		assert_eq!(roots, vec![(Scope::Public, Path::new("/lib/public"))]);
		assert!(path.root(Scope::Private).is_none());
	}
}

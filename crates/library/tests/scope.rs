// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Resolution order across the private and public package scopes

use langbridge_library::{LibraryManager, Scope, SearchPath};
use langbridge_testing::{package::PackageBuilder, tempdir::temp_dir};

#[test]
fn test_private_scope_shadows_public() {
	temp_dir(|dir| {
		let private = dir.join("private");
		let public = dir.join("public");
		let manager = LibraryManager::default();

		let v1 = PackageBuilder::new("shared-pkg", "1.0").module("shared_pkg/__init__.py", "").write_library(&dir.join("v1"))?;
		let v2 = PackageBuilder::new("shared-pkg", "2.0").module("shared_pkg/__init__.py", "").write_library(&dir.join("v2"))?;

		manager.install("shared-pkg", &v1, Scope::Private, &private).unwrap();
		// the public install must not trip over the private one
		manager.install("shared-pkg", &v2, Scope::Public, &public).unwrap();

		let path = SearchPath::new(Some(private.clone()), Some(public.clone()));
		let found = path.find("shared_pkg").unwrap().unwrap();
		assert_eq!(found.version, "1.0");
		assert_eq!(found.scope, Scope::Private);

		manager.uninstall("shared-pkg", Scope::Private, &private).unwrap();

		let found = path.find("Shared-Pkg").unwrap().unwrap();
		assert_eq!(found.version, "2.0");
		assert_eq!(found.scope, Scope::Public);
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_missing_package_resolves_to_none() {
	temp_dir(|dir| {
		let path = SearchPath::new(Some(dir.join("private")), Some(dir.join("public")));
		assert!(path.find("absent").unwrap().is_none());
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_nested_archive_is_rejected() {
	temp_dir(|dir| {
		let archive = PackageBuilder::new("nested", "1.0").module("nested.py", "").write_nested_library(dir)?;
		let root = dir.join("lib");

		let err = LibraryManager::default().install("nested", &archive, Scope::Public, &root).unwrap_err();
		assert!(err.to_string().contains("nested archives"));
		assert_eq!(std::fs::read_dir(&root)?.count(), 0);
		Ok(())
	})
	.unwrap();
}

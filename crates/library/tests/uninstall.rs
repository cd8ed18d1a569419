// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Manual cleanup after a package facility fails to uninstall

use std::{
	fs,
	path::Path,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use langbridge_library::{
	ArchiveFacility, LibraryInstallation, LibraryManager, PackageFacility, Scope, archive::Payload,
};
use langbridge_testing::{package::PackageBuilder, tempdir::temp_dir};
use langbridge_type::{Error, Result};

/// Installs like the archive facility; uninstall deletes the metadata and then fails.
struct BrokenUninstall {
	calls: Arc<AtomicUsize>,
}

impl PackageFacility for BrokenUninstall {
	fn install(&self, payload: &Payload, root: &Path, scratch: &Path) -> Result<()> {
		ArchiveFacility.install(payload, root, scratch)
	}

	fn uninstall(&self, name: &str, root: &Path) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if let Some(installation) = LibraryInstallation::find(root, name, Scope::Public)? {
			fs::remove_dir_all(&installation.metadata_dir).map_err(|err| Error::io("removing metadata", err))?;
		}
		Err(Error::library("uninstall failed halfway"))
	}
}

/// Reports success without removing anything.
struct NoopUninstall;

impl PackageFacility for NoopUninstall {
	fn install(&self, payload: &Payload, root: &Path, scratch: &Path) -> Result<()> {
		ArchiveFacility.install(payload, root, scratch)
	}

	fn uninstall(&self, _name: &str, _root: &Path) -> Result<()> {
		Ok(())
	}
}

#[test]
fn test_failed_uninstall_removes_declared_artifacts() {
	temp_dir(|dir| {
		let root = dir.join("lib");
		let calls = Arc::new(AtomicUsize::new(0));
		let manager = LibraryManager::new(BrokenUninstall {
			calls: calls.clone(),
		});

		let archive = PackageBuilder::new("flaky_pkg", "0.9")
			.module("flaky_pkg/__init__.py", "")
			.module("flaky_pkg/util.py", "")
			.module("flaky_helper.py", "")
			.shim("flaky_pkg-0.9-nspkg.pth")
			.write_library(dir)?;
		manager.install("flaky-pkg", &archive, Scope::Public, &root).unwrap();
		fs::write(root.join("unrelated.py"), "")?;

		manager.uninstall("flaky-pkg", Scope::Public, &root).unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(!root.join("flaky_pkg").exists());
		assert!(!root.join("flaky_helper.py").exists());
		assert!(!root.join("flaky_pkg-0.9.dist-info").exists());
		assert!(!root.join("flaky_pkg-0.9-nspkg.pth").exists());
		assert!(root.join("unrelated.py").exists());
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_still_resolvable_package_is_removed_manually() {
	temp_dir(|dir| {
		let root = dir.join("lib");
		let manager = LibraryManager::new(NoopUninstall);

		let archive = PackageBuilder::new("sticky", "1.2").module("sticky/__init__.py", "").write_library(dir)?;
		manager.install("sticky", &archive, Scope::Public, &root).unwrap();

		manager.uninstall("sticky", Scope::Public, &root).unwrap();
		assert!(LibraryInstallation::find(&root, "sticky", Scope::Public).unwrap().is_none());
		assert!(!root.join("sticky").exists());
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_uninstalling_unknown_package_only_clears_shims() {
	temp_dir(|dir| {
		let root = dir.join("lib");
		fs::create_dir_all(&root)?;
		fs::write(root.join("ghost.py"), "")?;

		LibraryManager::default().uninstall("ghost", Scope::Public, &root).unwrap();
		assert!(!root.join("ghost.py").exists());
		Ok(())
	})
	.unwrap();
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! External library management.
//!
//! Packages live in two scopes, each a directory whose direct children are full package
//! installations. The private scope is always searched before the public one.

pub mod archive;
pub mod facility;
pub mod installation;
pub mod manager;
pub mod scope;

pub use facility::{ArchiveFacility, CommandFacility, PackageFacility};
pub use installation::LibraryInstallation;
pub use manager::LibraryManager;
pub use scope::{Scope, SearchPath};

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Plinth plugin manager.
//!
//! This crate provides the error type, the data model shared by every
//! component (plugin records, project and platform paths), and the traits
//! for the external collaborators: the package manager and the per-platform
//! native integration hook.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PlinthError;
pub use types::{
    DependencyEntry, InstallOptions, InstalledPackage, PackageKind, PlatformId, PlatformTarget,
    PluginRecord, ProjectContext,
};

pub use traits::{NativeIntegration, PackageManager};

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin management for Plinth projects.
//!
//! - [`installer::PluginService`] adds, removes, lists, and prepares plugins.
//! - [`classifier`] decides whether an installed package is a plugin.
//! - [`compat`] checks plugins against the installed framework versions.
//! - [`manifest`] edits the project's dependency sections.
//! - [`native_cache::NativeBuildCache`] skips native integration when a
//!   plugin's native files are unchanged.
//! - [`npm::NpmPackageManager`] and [`integration::CopyNativeIntegration`]
//!   are the default collaborators.

pub mod classifier;
pub mod compat;
mod fs;
pub mod installer;
pub mod integration;
pub mod manifest;
pub mod native_cache;
pub mod npm;
pub mod platforms;

pub use classifier::{classify, load_package, PackageMetadata};
pub use compat::{is_compatible, CompatibilityWarning};
pub use installer::{AddReport, PlatformStep, PluginService, RemoveReport};
pub use integration::CopyNativeIntegration;
pub use manifest::{add_entry, remove_entry, ProjectManifest};
pub use native_cache::{
    hash_native_folder, NativeBuildCache, NativeHashLedger, PrepareEntry, PrepareOutcome,
    PrepareReport,
};
pub use npm::NpmPackageManager;
pub use platforms::discover_platforms;

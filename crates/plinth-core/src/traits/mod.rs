// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The plugin service never talks to npm or to a native project directly;
//! it goes through these traits, injected at construction. All traits use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod native;
pub mod package_manager;

pub use native::NativeIntegration;
pub use package_manager::PackageManager;

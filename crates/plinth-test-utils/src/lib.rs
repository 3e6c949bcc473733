// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Plinth integration tests.
//!
//! Provides mock collaborators and an on-disk project fixture for fast,
//! deterministic tests without npm or a native toolchain.
//!
//! # Components
//!
//! - [`MockPackageManager`] - Installs pre-registered packages into `node_modules`
//! - [`MockNativeIntegration`] - Records integrate/remove calls, fails on demand
//! - [`ProjectFixture`] - Temporary project with manifest and platform directories

pub mod fixture;
pub mod mock_native;
pub mod mock_package_manager;

pub use fixture::ProjectFixture;
pub use mock_native::{MockNativeIntegration, NativeCall};
pub use mock_package_manager::{MockPackage, MockPackageManager, PackageManagerCall};

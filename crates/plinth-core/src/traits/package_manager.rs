// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package manager collaborator (npm or a test double).

use std::path::Path;

use async_trait::async_trait;

use crate::error::PlinthError;
use crate::types::{InstallOptions, InstalledPackage};

/// Installs and uninstalls packages into a project's `node_modules`.
///
/// Timeouts and cancellation of the underlying process are owned by the
/// implementation.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Install `specifier` (a registry specifier or a local archive path)
    /// into `project_dir` and return the resolved package identity.
    async fn install(
        &self,
        specifier: &str,
        project_dir: &Path,
        options: &InstallOptions,
    ) -> Result<InstalledPackage, PlinthError>;

    /// Uninstall the package called `name` from `project_dir`.
    async fn uninstall(
        &self,
        name: &str,
        options: &InstallOptions,
        project_dir: &Path,
    ) -> Result<(), PlinthError>;
}

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native project integration collaborator.

use async_trait::async_trait;

use crate::error::PlinthError;
use crate::types::{PlatformTarget, PluginRecord, ProjectContext};

/// Merges a plugin's native assets into, and removes them from, a platform's
/// native project tree.
///
/// Callers catch and aggregate failures per platform; an error here never
/// aborts a pass over the other platforms.
#[async_trait]
pub trait NativeIntegration: Send + Sync {
    /// Copy or merge `plugin`'s native assets into `target`.
    async fn integrate(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        project: &ProjectContext,
    ) -> Result<(), PlinthError>;

    /// Remove `plugin`'s native code from `target`.
    async fn remove(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        project: &ProjectContext,
    ) -> Result<(), PlinthError>;
}

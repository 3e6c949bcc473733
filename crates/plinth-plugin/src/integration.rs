// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-copy native integration.
//!
//! `CopyNativeIntegration` stages a plugin into a platform's native project:
//! the plugin's `platforms/<platform>` folder goes to
//! `<native_project_root>/plugins/<name>` for the native build to pick up, and
//! the rest of the package goes to the module destination. A platform build
//! tool that needs deeper merging (Gradle includes, Xcode project edits)
//! supplies its own [`NativeIntegration`] instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use plinth_core::{
    NativeIntegration, PlatformTarget, PlinthError, PluginRecord, ProjectContext,
};
use tracing::debug;

use crate::fs::{copy_dir_recursive, remove_path};

/// Directory under the native project root holding staged plugin native code.
pub const PLUGINS_DIR: &str = "plugins";

/// Package subdirectory that is never copied into the module destination.
const NATIVE_SOURCES_DIR: &str = "platforms";

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyNativeIntegration;

impl CopyNativeIntegration {
    pub fn new() -> Self {
        Self
    }

    /// Where `plugin`'s native folder is staged for `target`.
    pub fn staged_native_dir(plugin: &PluginRecord, target: &PlatformTarget) -> PathBuf {
        target
            .native_project_root
            .join(PLUGINS_DIR)
            .join(&plugin.name)
    }
}

fn native_error(plugin: &PluginRecord, target: &PlatformTarget, message: String) -> PlinthError {
    PlinthError::NativeIntegration {
        plugin: plugin.name.clone(),
        platform: target.platform.to_string(),
        message,
    }
}

/// Copy every top-level entry of `package_dir` except the native sources.
fn copy_package(package_dir: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(package_dir)? {
        let entry = entry?;
        if entry.file_name() == NATIVE_SOURCES_DIR {
            continue;
        }
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            std::fs::copy(&path, &dest_path)?;
        }
    }
    Ok(())
}

#[async_trait]
impl NativeIntegration for CopyNativeIntegration {
    async fn integrate(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        _project: &ProjectContext,
    ) -> Result<(), PlinthError> {
        let native_src = plugin.native_folder_path(target.platform);
        let native_dest = Self::staged_native_dir(plugin, target);
        let package_src = plugin.full_path.clone();
        let package_dest = target.module_destination().join(&plugin.name);

        debug!(
            plugin = %plugin.name,
            platform = %target.platform,
            dest = %native_dest.display(),
            "staging native code"
        );

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            remove_path(&native_dest)?;
            if native_src.is_dir() {
                copy_dir_recursive(&native_src, &native_dest)?;
            }
            remove_path(&package_dest)?;
            copy_package(&package_src, &package_dest)
        })
        .await
        .map_err(|e| native_error(plugin, target, format!("copy task failed: {e}")))?
        .map_err(|e| native_error(plugin, target, e.to_string()))
    }

    async fn remove(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        _project: &ProjectContext,
    ) -> Result<(), PlinthError> {
        let staged = Self::staged_native_dir(plugin, target);
        let removed = remove_path(&staged)
            .map_err(|e| native_error(plugin, target, e.to_string()))?;
        debug!(plugin = %plugin.name, platform = %target.platform, removed, "unstaged native code");
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Plinth plugin manager.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use plinth_core::types::DEFAULT_LEDGER_FILE_NAME;
use plinth_core::{InstallOptions, PlatformId};
use serde::{Deserialize, Serialize};

/// Top-level Plinth configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlinthConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Package manager invocation settings.
    #[serde(default)]
    pub npm: NpmConfig,

    /// Plugin metadata and native cache settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Per-platform framework runtime settings.
    #[serde(default)]
    pub platforms: PlatformsConfig,
}

impl PlinthConfig {
    /// Options forwarded to every package manager call.
    ///
    /// `save` is always set: plugin installs are always recorded in the manifest.
    pub fn install_options(&self) -> InstallOptions {
        InstallOptions {
            save: true,
            disable_npm_install: self.npm.disable_npm_install,
            framework_path: self.npm.framework_path.clone(),
            ignore_scripts: self.npm.ignore_scripts,
            path: self.npm.path.clone(),
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Package manager settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NpmConfig {
    /// Executable used for install/uninstall.
    #[serde(default = "default_npm_binary")]
    pub binary: String,

    /// Resolve packages from `node_modules` without running the package manager.
    #[serde(default)]
    pub disable_npm_install: bool,

    /// Local path of the framework package, forwarded to the package manager.
    #[serde(default)]
    pub framework_path: Option<PathBuf>,

    /// Skip package lifecycle scripts.
    #[serde(default)]
    pub ignore_scripts: bool,

    /// Install prefix override.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for NpmConfig {
    fn default() -> Self {
        Self {
            binary: default_npm_binary(),
            disable_npm_install: false,
            framework_path: None,
            ignore_scripts: false,
            path: None,
        }
    }
}

fn default_npm_binary() -> String {
    "npm".to_string()
}

/// Plugin metadata and native cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Key in a package manifest that marks the package as a native plugin.
    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,

    /// File name of the per-platform native hash ledger.
    #[serde(default = "default_ledger_file_name")]
    pub ledger_file_name: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            metadata_key: default_metadata_key(),
            ledger_file_name: default_ledger_file_name(),
        }
    }
}

fn default_metadata_key() -> String {
    "nativescript".to_string()
}

fn default_ledger_file_name() -> String {
    DEFAULT_LEDGER_FILE_NAME.to_string()
}

/// Framework runtime packages, one per platform.
///
/// The installed framework version for a platform is read from the project
/// manifest under `<metadata_key>.<runtime>.version`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformsConfig {
    #[serde(default = "default_android_runtime")]
    pub android_runtime: String,

    #[serde(default = "default_ios_runtime")]
    pub ios_runtime: String,
}

impl PlatformsConfig {
    /// Runtime package name for `platform`.
    pub fn runtime_package(&self, platform: PlatformId) -> &str {
        match platform {
            PlatformId::Android => &self.android_runtime,
            PlatformId::Ios => &self.ios_runtime,
        }
    }
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            android_runtime: default_android_runtime(),
            ios_runtime: default_ios_runtime(),
        }
    }
}

fn default_android_runtime() -> String {
    "tns-android".to_string()
}

fn default_ios_runtime() -> String {
    "tns-ios".to_string()
}

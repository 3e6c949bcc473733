// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the plugin service, the native build cache, and
//! the collaborator traits.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// File name of the project's dependency manifest.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Directory packages are installed into, relative to the project root.
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Default file name of the per-platform native hash ledger.
pub const DEFAULT_LEDGER_FILE_NAME: &str = ".plugin-hashes.json";

/// A supported native build target.
///
/// Parsing is case-insensitive; `ALL` is the platform enumeration order used
/// by every per-platform loop.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Android,
    Ios,
}

impl PlatformId {
    /// Every supported platform, in enumeration order.
    pub const ALL: [PlatformId; 2] = [PlatformId::Android, PlatformId::Ios];
}

/// Paths describing the project one operation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Project root directory.
    pub root: PathBuf,
    /// Directory holding one native project per installed platform.
    pub platforms_dir: PathBuf,
    /// The dependency manifest (`package.json`).
    pub manifest_path: PathBuf,
    /// Project name, used for the iOS native project layout.
    pub name: String,
}

impl ProjectContext {
    /// Build a context with the conventional layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().replace(|c: char| !c.is_alphanumeric(), ""))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "app".to_string());
        Self {
            platforms_dir: root.join("platforms"),
            manifest_path: root.join(MANIFEST_FILE_NAME),
            root,
            name,
        }
    }

    /// The project's `node_modules` directory.
    pub fn node_modules_dir(&self) -> PathBuf {
        self.root.join(NODE_MODULES_DIR)
    }

    /// Path of the installed package manifest for `name`.
    ///
    /// Scoped names (`@scope/pkg`) map to nested directories.
    pub fn package_manifest_path(&self, name: &str) -> PathBuf {
        let mut path = self.node_modules_dir();
        for segment in name.split('/') {
            path.push(segment);
        }
        path.join(MANIFEST_FILE_NAME)
    }
}

/// One installed native platform of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTarget {
    pub platform: PlatformId,
    /// Where the application's JavaScript payload is placed inside the native project.
    pub app_destination: PathBuf,
    /// Root of the platform's native project tree.
    pub native_project_root: PathBuf,
}

impl PlatformTarget {
    /// Build the target for `platform` using the conventional native layout.
    pub fn for_project(platform: PlatformId, project: &ProjectContext) -> Self {
        let native_project_root = project.platforms_dir.join(platform.as_ref());
        let app_destination = match platform {
            PlatformId::Android => native_project_root
                .join("app")
                .join("src")
                .join("main")
                .join("assets")
                .join("app"),
            PlatformId::Ios => native_project_root.join(&project.name).join("app"),
        };
        Self {
            platform,
            app_destination,
            native_project_root,
        }
    }

    /// Directory plugin packages are copied into for this platform.
    pub fn module_destination(&self) -> PathBuf {
        self.app_destination.join("tns_modules")
    }

    /// Location of this platform's native hash ledger.
    pub fn ledger_path(&self, file_name: &str) -> PathBuf {
        self.native_project_root.join(file_name)
    }
}

/// A `{name, version}` pair from a manifest dependency section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub name: String,
    pub version: String,
    /// True when read from `devDependencies`.
    #[serde(default)]
    pub dev: bool,
}

/// An installed package carrying native per-platform integration metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: String,
    pub version: String,
    /// Directory the package manager populated for this plugin.
    pub full_path: PathBuf,
    /// Minimum framework version per platform, keyed by lowercase platform id.
    #[serde(default)]
    pub min_versions: BTreeMap<String, String>,
    /// Opaque plugin configuration variables.
    #[serde(default)]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl PluginRecord {
    /// `<full_path>/platforms/<platform>`.
    pub fn native_folder_path(&self, platform: PlatformId) -> PathBuf {
        self.full_path.join("platforms").join(platform.as_ref())
    }

    /// Declared minimum framework version for `platform`, if any.
    pub fn min_version(&self, platform: PlatformId) -> Option<&str> {
        self.min_versions
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(platform.as_ref()))
            .map(|(_, version)| version.as_str())
    }
}

/// Result of classifying a package: either a plugin or a plain dependency.
#[derive(Debug, Clone, PartialEq)]
pub enum PackageKind {
    Plugin(PluginRecord),
    Dependency(DependencyEntry),
}

impl PackageKind {
    pub fn is_plugin(&self) -> bool {
        matches!(self, PackageKind::Plugin(_))
    }

    pub fn name(&self) -> &str {
        match self {
            PackageKind::Plugin(record) => &record.name,
            PackageKind::Dependency(entry) => &entry.name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            PackageKind::Plugin(record) => &record.version,
            PackageKind::Dependency(entry) => &entry.version,
        }
    }

    /// Consume into the plugin record, if this is a plugin.
    pub fn into_plugin(self) -> Option<PluginRecord> {
        match self {
            PackageKind::Plugin(record) => Some(record),
            PackageKind::Dependency(_) => None,
        }
    }
}

/// Options forwarded to the package manager on install and uninstall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Record the package in the manifest (always true for plugin installs).
    pub save: bool,
    /// Skip the package manager's own install step.
    pub disable_npm_install: bool,
    /// Local path of the framework package, if overridden.
    pub framework_path: Option<PathBuf>,
    /// Skip package lifecycle scripts.
    pub ignore_scripts: bool,
    /// Install prefix override.
    pub path: Option<PathBuf>,
}

/// Identity of a package after the package manager installed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}


// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock package manager for deterministic testing.
//!
//! `MockPackageManager` implements `PackageManager` against a table of
//! pre-registered packages. Installing writes the package's `package.json`
//! and native files under `node_modules`; uninstalling deletes the package
//! directory. Every call is captured for assertions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use plinth_core::types::NODE_MODULES_DIR;
use plinth_core::{InstallOptions, InstalledPackage, PackageManager, PlinthError};

/// A package the mock can install.
#[derive(Debug, Clone)]
pub struct MockPackage {
    pub name: String,
    pub version: String,
    /// Extra `package.json` fields (e.g. the plugin metadata section).
    pub metadata: serde_json::Value,
    /// Files written relative to the package directory.
    pub files: Vec<(String, Vec<u8>)>,
}

impl MockPackage {
    /// A plain dependency with no plugin metadata.
    pub fn dependency(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            metadata: serde_json::json!({}),
            files: Vec::new(),
        }
    }

    /// A plugin whose metadata section lists `platforms` minimum versions.
    pub fn plugin(name: &str, version: &str, platforms: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            metadata: serde_json::json!({ "nativescript": { "platforms": platforms } }),
            files: Vec::new(),
        }
    }

    /// Add a file relative to the package directory.
    pub fn with_file(mut self, relative: &str, contents: &[u8]) -> Self {
        self.files.push((relative.to_string(), contents.to_vec()));
        self
    }

    fn package_json(&self) -> serde_json::Value {
        let mut doc = serde_json::json!({ "name": self.name, "version": self.version });
        if let (Some(doc), Some(extra)) = (doc.as_object_mut(), self.metadata.as_object()) {
            for (key, value) in extra {
                doc.insert(key.clone(), value.clone());
            }
        }
        doc
    }
}

/// A captured package manager call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManagerCall {
    Install {
        specifier: String,
        options: InstallOptions,
    },
    Uninstall {
        name: String,
    },
}

/// A mock package manager backed by a table of known packages.
pub struct MockPackageManager {
    packages: Mutex<HashMap<String, MockPackage>>,
    calls: Mutex<Vec<PackageManagerCall>>,
    fail_uninstall: Mutex<bool>,
}

impl MockPackageManager {
    pub fn new() -> Self {
        Self {
            packages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_uninstall: Mutex::new(false),
        }
    }

    /// Register `package` under `specifier`. It is also reachable by name.
    pub fn with_package(mut self, specifier: &str, package: MockPackage) -> Self {
        let packages = self.packages.get_mut();
        packages.insert(package.name.clone(), package.clone());
        packages.insert(specifier.to_string(), package);
        self
    }

    /// Make every subsequent uninstall fail.
    pub async fn set_fail_uninstall(&self, fail: bool) {
        *self.fail_uninstall.lock().await = fail;
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<PackageManagerCall> {
        self.calls.lock().await.clone()
    }

    /// Specifiers passed to `install`, in order.
    pub async fn installed_specifiers(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                PackageManagerCall::Install { specifier, .. } => Some(specifier.clone()),
                PackageManagerCall::Uninstall { .. } => None,
            })
            .collect()
    }

    /// Names passed to `uninstall`, in order.
    pub async fn uninstalled_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                PackageManagerCall::Uninstall { name } => Some(name.clone()),
                PackageManagerCall::Install { .. } => None,
            })
            .collect()
    }

    async fn lookup(&self, specifier: &str) -> Option<MockPackage> {
        let packages = self.packages.lock().await;
        if let Some(package) = packages.get(specifier) {
            return Some(package.clone());
        }
        // `name@range`: the scope prefix of `@scope/name` is not a separator.
        let split_at = specifier
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '@')
            .map(|(i, _)| i)?;
        packages.get(&specifier[..split_at]).cloned()
    }
}

impl Default for MockPackageManager {
    fn default() -> Self {
        Self::new()
    }
}

fn package_dir(project_dir: &Path, name: &str) -> PathBuf {
    let mut dir = project_dir.join(NODE_MODULES_DIR);
    for segment in name.split('/') {
        dir.push(segment);
    }
    dir
}

fn io_error(path: &Path, source: std::io::Error) -> PlinthError {
    PlinthError::io(path, source)
}

#[async_trait]
impl PackageManager for MockPackageManager {
    async fn install(
        &self,
        specifier: &str,
        project_dir: &Path,
        options: &InstallOptions,
    ) -> Result<InstalledPackage, PlinthError> {
        self.calls.lock().await.push(PackageManagerCall::Install {
            specifier: specifier.to_string(),
            options: options.clone(),
        });

        let package = self
            .lookup(specifier)
            .await
            .ok_or_else(|| PlinthError::PackageManager {
                message: format!("404 Not Found: {specifier}"),
                source: None,
            })?;

        let dir = package_dir(project_dir, &package.name);
        std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        let manifest = dir.join("package.json");
        let body = serde_json::to_string_pretty(&package.package_json())
            .map_err(|e| PlinthError::Internal(e.to_string()))?;
        std::fs::write(&manifest, body).map_err(|e| io_error(&manifest, e))?;
        for (relative, contents) in &package.files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
            std::fs::write(&path, contents).map_err(|e| io_error(&path, e))?;
        }

        tracing::debug!(name = %package.name, "mock package installed");
        Ok(InstalledPackage {
            name: package.name,
            version: package.version,
        })
    }

    async fn uninstall(
        &self,
        name: &str,
        _options: &InstallOptions,
        project_dir: &Path,
    ) -> Result<(), PlinthError> {
        self.calls.lock().await.push(PackageManagerCall::Uninstall {
            name: name.to_string(),
        });

        if *self.fail_uninstall.lock().await {
            return Err(PlinthError::PackageManager {
                message: format!("uninstall of {name} failed"),
                source: None,
            });
        }

        let dir = package_dir(project_dir, name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_writes_package_and_records_call() {
        let dir = tempfile::tempdir().unwrap();
        let pm = MockPackageManager::new().with_package(
            "@scope/camera@^2.0.0",
            MockPackage::plugin("@scope/camera", "2.0.1", serde_json::json!({"ios": "3.0.0"}))
                .with_file("platforms/ios/Info.plist", b"<plist/>"),
        );

        let installed = pm
            .install("@scope/camera@^2.0.0", dir.path(), &InstallOptions::default())
            .await
            .unwrap();
        assert_eq!(installed.name, "@scope/camera");

        let pkg = dir.path().join("node_modules/@scope/camera");
        assert!(pkg.join("package.json").is_file());
        assert!(pkg.join("platforms/ios/Info.plist").is_file());
        assert_eq!(pm.installed_specifiers().await, vec!["@scope/camera@^2.0.0"]);
    }

    #[tokio::test]
    async fn install_by_name_with_range() {
        let dir = tempfile::tempdir().unwrap();
        let pm = MockPackageManager::new()
            .with_package("lodash", MockPackage::dependency("lodash", "4.17.21"));
        let installed = pm
            .install("lodash@4.17.21", dir.path(), &InstallOptions::default())
            .await
            .unwrap();
        assert_eq!(installed.version, "4.17.21");
    }

    #[tokio::test]
    async fn unknown_specifier_fails() {
        let dir = tempfile::tempdir().unwrap();
        let pm = MockPackageManager::new();
        let err = pm
            .install("missing", dir.path(), &InstallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlinthError::PackageManager { .. }));
    }

    #[tokio::test]
    async fn uninstall_removes_directory_and_can_fail() {
        let dir = tempfile::tempdir().unwrap();
        let pm = MockPackageManager::new()
            .with_package("lodash", MockPackage::dependency("lodash", "4.17.21"));
        let options = InstallOptions::default();
        pm.install("lodash", dir.path(), &options).await.unwrap();

        pm.uninstall("lodash", &options, dir.path()).await.unwrap();
        assert!(!dir.path().join("node_modules/lodash").exists());

        pm.set_fail_uninstall(true).await;
        assert!(pm.uninstall("lodash", &options, dir.path()).await.is_err());
        assert_eq!(pm.uninstalled_names().await, vec!["lodash", "lodash"]);
    }
}

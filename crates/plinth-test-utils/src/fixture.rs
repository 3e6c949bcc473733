// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary on-disk project for integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use plinth_core::{PlatformId, PlatformTarget, ProjectContext};

/// A project rooted in a temporary directory, deleted on drop.
///
/// The root is a `demo` directory inside the temp dir so the project name
/// (and the iOS native layout derived from it) is stable.
pub struct ProjectFixture {
    _dir: TempDir,
    pub project: ProjectContext,
}

impl ProjectFixture {
    /// Create a project with an empty `package.json`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().join("demo");
        std::fs::create_dir_all(&root).expect("create project root");
        let fixture = Self {
            project: ProjectContext::new(root),
            _dir: dir,
        };
        fixture.write_manifest(&serde_json::json!({
            "name": "demo",
            "version": "1.0.0",
            "dependencies": {},
            "devDependencies": {}
        }));
        fixture
    }

    /// Create the native project directory for `platform`.
    pub fn with_platform(self, platform: PlatformId) -> Self {
        let target = self.target(platform);
        std::fs::create_dir_all(&target.app_destination).expect("create platform dir");
        self
    }

    /// Record the installed framework runtime version in the manifest.
    pub fn with_framework_version(self, runtime: &str, version: &str) -> Self {
        let mut manifest = self.read_manifest();
        let section = manifest
            .as_object_mut()
            .expect("manifest is an object")
            .entry("nativescript")
            .or_insert_with(|| serde_json::json!({}));
        section[runtime] = serde_json::json!({ "version": version });
        self.write_manifest(&manifest);
        self
    }

    pub fn root(&self) -> &Path {
        &self.project.root
    }

    pub fn target(&self, platform: PlatformId) -> PlatformTarget {
        PlatformTarget::for_project(platform, &self.project)
    }

    pub fn read_manifest(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.project.manifest_path).expect("read manifest");
        serde_json::from_str(&raw).expect("manifest is JSON")
    }

    pub fn write_manifest(&self, manifest: &serde_json::Value) {
        let body = serde_json::to_string_pretty(manifest).expect("serialize manifest");
        std::fs::write(&self.project.manifest_path, body).expect("write manifest");
    }

    /// Write `contents` at `relative` under the project root, creating parents.
    pub fn write_file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.project.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    /// Place an already-installed package into `node_modules`.
    pub fn install_package(&self, name: &str, package_json: serde_json::Value) -> PathBuf {
        let body = serde_json::to_string_pretty(&package_json).expect("serialize package");
        let path = self.write_file(&format!("node_modules/{name}/package.json"), body.as_bytes());
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Project manifest (`package.json`) reader and dependency-section mutator.
//!
//! Only the `dependencies` and `devDependencies` sections are touched; every
//! other top-level key, and the key order, survives a round trip. Writes are
//! atomic and skipped entirely when nothing changed.

use std::path::{Path, PathBuf};

use plinth_core::{DependencyEntry, PlinthError, ProjectContext};
use serde_json::{Map, Value};
use tracing::debug;

use crate::fs::write_atomic;

pub const DEPENDENCIES: &str = "dependencies";
pub const DEV_DEPENDENCIES: &str = "devDependencies";

fn section_name(dev: bool) -> &'static str {
    if dev { DEV_DEPENDENCIES } else { DEPENDENCIES }
}

/// An in-memory copy of a project's `package.json`.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl ProjectManifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, PlinthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| PlinthError::Manifest {
            path: path.to_path_buf(),
            message: format!("failed to read: {e}"),
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| PlinthError::Manifest {
            path: path.to_path_buf(),
            message: format!("invalid JSON: {e}"),
        })?;
        match value {
            Value::Object(document) => Ok(Self {
                path: path.to_path_buf(),
                document,
            }),
            _ => Err(PlinthError::Manifest {
                path: path.to_path_buf(),
                message: "top-level value must be an object".to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry of both dependency sections, `dependencies` first.
    pub fn dependencies(&self) -> Vec<DependencyEntry> {
        [false, true]
            .into_iter()
            .flat_map(|dev| {
                self.section(dev)
                    .into_iter()
                    .flatten()
                    .map(move |(name, version)| DependencyEntry {
                        name: name.clone(),
                        version: version.as_str().unwrap_or_default().to_string(),
                        dev,
                    })
            })
            .collect()
    }

    /// Look up `name` in either section.
    pub fn get(&self, name: &str) -> Option<DependencyEntry> {
        self.dependencies().into_iter().find(|entry| entry.name == name)
    }

    /// Installed framework runtime version, stored as
    /// `<metadata_key>.<runtime>.version`.
    pub fn framework_version(&self, metadata_key: &str, runtime: &str) -> Option<String> {
        self.document
            .get(metadata_key)?
            .get(runtime)?
            .get("version")?
            .as_str()
            .map(str::to_string)
    }

    fn section(&self, dev: bool) -> Option<&Map<String, Value>> {
        self.document.get(section_name(dev))?.as_object()
    }

    /// Declare `name` at `version` in the section selected by `dev`,
    /// removing it from the opposite section first.
    ///
    /// Returns whether the document changed.
    pub fn set_entry(&mut self, name: &str, version: &str, dev: bool) -> bool {
        let moved = self
            .document
            .get_mut(section_name(!dev))
            .and_then(Value::as_object_mut)
            .and_then(|opposite| opposite.shift_remove(name))
            .is_some();

        let slot = self
            .document
            .entry(section_name(dev))
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let mut changed = moved;
        if let Value::Object(target) = slot
            && target.get(name).and_then(Value::as_str) != Some(version)
        {
            target.insert(name.to_string(), Value::String(version.to_string()));
            changed = true;
        }
        changed
    }

    /// Remove `name` from both sections. Returns whether anything was removed.
    pub fn remove_from_sections(&mut self, name: &str) -> bool {
        let mut removed = false;
        for dev in [false, true] {
            if let Some(section) = self
                .document
                .get_mut(section_name(dev))
                .and_then(Value::as_object_mut)
            {
                removed |= section.shift_remove(name).is_some();
            }
        }
        removed
    }

    /// Persist the document atomically, pretty-printed with a trailing newline.
    pub fn save(&self) -> Result<(), PlinthError> {
        let mut body = serde_json::to_string_pretty(&self.document).map_err(|e| {
            PlinthError::Manifest {
                path: self.path.clone(),
                message: format!("failed to serialize: {e}"),
            }
        })?;
        body.push('\n');
        write_atomic(&self.path, body.as_bytes()).map_err(|e| PlinthError::Manifest {
            path: self.path.clone(),
            message: format!("failed to write: {e}"),
        })
    }
}

/// Declare `name` in the project manifest and persist the change.
///
/// A dependency is never declared in both sections: an entry in the opposite
/// section is removed first. Returns whether the file was written.
pub fn add_entry(
    project: &ProjectContext,
    name: &str,
    version: &str,
    dev: bool,
) -> Result<bool, PlinthError> {
    let mut manifest = ProjectManifest::load(&project.manifest_path)?;
    if !manifest.set_entry(name, version, dev) {
        debug!(name, version, dev, "manifest entry already up to date");
        return Ok(false);
    }
    manifest.save()?;
    debug!(name, version, section = section_name(dev), "manifest entry recorded");
    Ok(true)
}

/// Remove `name` from both dependency sections.
///
/// The file is written only if an entry was actually removed. Returns
/// whether the file was written.
pub fn remove_entry(project: &ProjectContext, name: &str) -> Result<bool, PlinthError> {
    let mut manifest = ProjectManifest::load(&project.manifest_path)?;
    if !manifest.remove_from_sections(name) {
        return Ok(false);
    }
    manifest.save()?;
    debug!(name, "manifest entry removed");
    Ok(true)
}

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package classification: plugin or plain dependency.
//!
//! A package is a plugin iff its own `package.json` carries an object under
//! the configured metadata key (default `nativescript`). That decision is
//! made once here; downstream code matches on [`PackageKind`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use plinth_core::{DependencyEntry, PackageKind, PlinthError, PluginRecord, ProjectContext};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The fields of a package's own `package.json` that classification reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Explicit package directory, when the metadata was produced by a cache.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl PackageMetadata {
    /// Parse metadata from a raw JSON document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Classify `metadata` for `project`.
///
/// `full_path` is the metadata's `directory` when present, otherwise the
/// directory of `node_modules/<name>/package.json`. Pure: touches no files.
pub fn classify(
    metadata: &PackageMetadata,
    project: &ProjectContext,
    metadata_key: &str,
) -> PackageKind {
    let Some(section) = metadata.rest.get(metadata_key).and_then(Value::as_object) else {
        return PackageKind::Dependency(DependencyEntry {
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            dev: false,
        });
    };

    let full_path = metadata.directory.clone().unwrap_or_else(|| {
        let manifest = project.package_manifest_path(&metadata.name);
        manifest
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| project.node_modules_dir().join(&metadata.name))
    });

    let min_versions: BTreeMap<String, String> = section
        .get("platforms")
        .and_then(Value::as_object)
        .map(|platforms| {
            platforms
                .iter()
                .filter_map(|(platform, version)| {
                    version
                        .as_str()
                        .map(|v| (platform.to_ascii_lowercase(), v.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    let variables = section
        .get("variables")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    PackageKind::Plugin(PluginRecord {
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        full_path,
        min_versions,
        variables,
    })
}

/// Read and classify the installed package `name`.
///
/// Returns `Ok(None)` when the package is not present in `node_modules`.
pub fn load_package(
    project: &ProjectContext,
    name: &str,
    metadata_key: &str,
) -> Result<Option<PackageKind>, PlinthError> {
    let path = project.package_manifest_path(name);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PlinthError::io(path, e)),
    };
    let value: Value = serde_json::from_str(&raw).map_err(|e| PlinthError::Metadata {
        path: path.clone(),
        message: e.to_string(),
    })?;
    let metadata = PackageMetadata::from_value(value).map_err(|e| PlinthError::Metadata {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok(Some(classify(&metadata, project, metadata_key)))
}

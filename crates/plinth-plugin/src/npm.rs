// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `npm`-backed [`PackageManager`].
//!
//! Shells out to the configured npm binary inside the project directory. With
//! `disable_npm_install` set, no process is spawned: install only resolves a
//! package already present in `node_modules`, and uninstall only deletes it.

use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use plinth_core::{InstallOptions, InstalledPackage, PackageManager, PlinthError, ProjectContext};
use tracing::{debug, info};

use crate::classifier::PackageMetadata;
use crate::fs::remove_path;
use crate::manifest::ProjectManifest;

/// Environment variable carrying `framework_path` to install scripts.
pub const FRAMEWORK_PATH_ENV: &str = "PLINTH_FRAMEWORK_PATH";

pub struct NpmPackageManager {
    binary: String,
}

impl NpmPackageManager {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(
        &self,
        verb: &str,
        target: &str,
        project_dir: &Path,
        options: &InstallOptions,
    ) -> Result<(), PlinthError> {
        let mut args: Vec<OsString> = vec![verb.into(), target.into()];
        if options.save {
            args.push("--save".into());
        }
        if options.ignore_scripts {
            args.push("--ignore-scripts".into());
        }
        if let Some(prefix) = &options.path {
            args.push("--prefix".into());
            args.push(prefix.into());
        }

        let mut command = tokio::process::Command::new(&self.binary);
        command.args(&args).current_dir(project_dir);
        if let Some(framework_path) = &options.framework_path {
            command.env(FRAMEWORK_PATH_ENV, framework_path);
        }

        debug!(binary = %self.binary, ?args, dir = %project_dir.display(), "running package manager");
        let output = command.output().await.map_err(|e| PlinthError::PackageManager {
            message: format!("failed to execute `{} {verb}`: {e}", self.binary),
            source: Some(Box::new(e)),
        })?;

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlinthError::PackageManager {
                message: format!(
                    "`{} {verb} {target}` exited with code {exit_code}: {}",
                    self.binary,
                    stderr.trim()
                ),
                source: None,
            });
        }
        Ok(())
    }
}

/// Package name a registry specifier refers to, if it can be derived from the
/// text alone (`camera`, `camera@^2`, `@scope/camera@1.0.0`).
///
/// Paths, URLs, and git specifiers yield `None`.
pub fn package_name_from_specifier(specifier: &str) -> Option<String> {
    let specifier = specifier.trim();
    if specifier.is_empty()
        || specifier.starts_with(['.', '/', '~'])
        || specifier.contains("://")
        || specifier.contains(':')
        || specifier.ends_with(".tgz")
        || specifier.ends_with(".tar.gz")
    {
        return None;
    }

    let name = if let Some(scoped) = specifier.strip_prefix('@') {
        let slash = scoped.find('/')?;
        let end = scoped[slash..].find('@').map_or(scoped.len(), |at| slash + at);
        &specifier[..end + 1]
    } else {
        specifier.split('@').next().unwrap_or_default()
    };

    let valid = !name.is_empty() && !name.ends_with('/') && name.matches('/').count() <= 1;
    (valid && (name.starts_with('@') || !name.contains('/'))).then(|| name.to_string())
}

/// Name declared by the top-level `package.json` of a gzipped npm tarball.
///
/// `Ok(None)` when the archive has no such entry.
pub fn package_name_from_archive(archive: &Path) -> Result<Option<String>, PlinthError> {
    let file = std::fs::File::open(archive).map_err(|e| PlinthError::io(archive, e))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));
    let entries = tarball.entries().map_err(|e| PlinthError::io(archive, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| PlinthError::io(archive, e))?;
        let path = entry.path().map_err(|e| PlinthError::io(archive, e))?.into_owned();
        // npm packs everything under a single top-level directory, usually `package/`.
        if path.components().count() != 2 || path.file_name() != Some(OsStr::new("package.json")) {
            continue;
        }
        let mut raw = String::new();
        entry
            .read_to_string(&mut raw)
            .map_err(|e| PlinthError::io(archive, e))?;
        let metadata: PackageMetadata =
            serde_json::from_str(&raw).map_err(|e| PlinthError::Metadata {
                path: archive.join(&path),
                message: e.to_string(),
            })?;
        return Ok(Some(metadata.name));
    }
    Ok(None)
}

/// Package name for `specifier` without consulting the package manager:
/// parsed from a registry specifier, or read from a local tarball.
fn resolve_name(specifier: &str, project_dir: &Path) -> Result<String, PlinthError> {
    if let Some(name) = package_name_from_specifier(specifier) {
        return Ok(name);
    }
    let archive = project_dir.join(specifier.trim());
    if archive.is_file()
        && let Some(name) = package_name_from_archive(&archive)?
    {
        debug!(archive = %archive.display(), name = %name, "package name read from archive");
        return Ok(name);
    }
    Err(PlinthError::PackageManager {
        message: format!("cannot determine which package {specifier} installed"),
        source: None,
    })
}

/// Read `node_modules/<name>/package.json` under `project_dir`.
fn read_installed(project_dir: &Path, name: &str) -> Result<Option<InstalledPackage>, PlinthError> {
    let path = ProjectContext::new(project_dir).package_manifest_path(name);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PlinthError::io(path, e)),
    };
    let metadata: PackageMetadata = serde_json::from_str(&raw).map_err(|e| PlinthError::Metadata {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok(Some(InstalledPackage {
        name: metadata.name,
        version: metadata.version,
    }))
}

/// Names declared in the project manifest, or empty if it cannot be read.
fn declared_names(project_dir: &Path) -> BTreeSet<String> {
    let context = ProjectContext::new(project_dir);
    ProjectManifest::load(&context.manifest_path)
        .map(|manifest| manifest.dependencies().into_iter().map(|d| d.name).collect())
        .unwrap_or_default()
}

#[async_trait]
impl PackageManager for NpmPackageManager {
    async fn install(
        &self,
        specifier: &str,
        project_dir: &Path,
        options: &InstallOptions,
    ) -> Result<InstalledPackage, PlinthError> {
        if options.disable_npm_install {
            let name = resolve_name(specifier, project_dir)?;
            return read_installed(project_dir, &name)?.ok_or_else(|| PlinthError::PackageManager {
                message: format!("{name} is not present in node_modules and npm install is disabled"),
                source: None,
            });
        }

        let before = declared_names(project_dir);
        self.run("install", specifier, project_dir, options).await?;
        let added: Vec<String> = declared_names(project_dir)
            .difference(&before)
            .cloned()
            .collect();

        // Reinstalling an already declared package leaves the manifest unchanged.
        let name = match added.as_slice() {
            [only] => only.clone(),
            _ => resolve_name(specifier, project_dir)?,
        };

        let installed = read_installed(project_dir, &name)?.ok_or_else(|| {
            PlinthError::PackageManager {
                message: format!("{name} is missing from node_modules after install"),
                source: None,
            }
        })?;
        info!(name = %installed.name, version = %installed.version, "package installed");
        Ok(installed)
    }

    async fn uninstall(
        &self,
        name: &str,
        options: &InstallOptions,
        project_dir: &Path,
    ) -> Result<(), PlinthError> {
        if options.disable_npm_install {
            let mut dir = ProjectContext::new(project_dir).package_manifest_path(name);
            dir.pop();
            remove_path(&dir).map_err(|e| PlinthError::io(&dir, e))?;
            return Ok(());
        }
        self.run("uninstall", name, project_dir, options).await?;
        info!(name, "package uninstalled");
        Ok(())
    }
}

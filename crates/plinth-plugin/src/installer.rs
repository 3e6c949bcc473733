// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin install/remove orchestration.
//!
//! [`PluginService`] drives the package manager, the classifier, the
//! compatibility check, the manifest mutator, and the native hook for one
//! project. `add` and `remove` run under a per-project lock, so package
//! manager calls and manifest writes never interleave.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use plinth_config::PlinthConfig;
use plinth_core::{
    InstallOptions, NativeIntegration, PackageKind, PackageManager, PlatformId, PlatformTarget,
    PlinthError, PluginRecord, ProjectContext,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::classifier::load_package;
use crate::compat::{self, CompatibilityWarning};
use crate::fs::remove_path;
use crate::manifest::{self, ProjectManifest};
use crate::native_cache::{NativeBuildCache, PrepareReport};
use crate::npm::package_name_from_specifier;
use crate::platforms::discover_platforms;

/// Result of a successful [`PluginService::add`].
#[derive(Debug)]
pub struct AddReport {
    pub plugin: PluginRecord,
    /// Advisory compatibility findings, one per affected platform.
    pub warnings: Vec<CompatibilityWarning>,
    /// Whether the project manifest was rewritten.
    pub manifest_updated: bool,
}

/// Outcome of the native removal step on one platform.
#[derive(Debug)]
pub struct PlatformStep {
    pub platform: PlatformId,
    pub result: Result<(), PlinthError>,
}

/// Result of a successful [`PluginService::remove`].
#[derive(Debug)]
pub struct RemoveReport {
    pub name: String,
    /// Per-platform native removal, in platform order. Empty for plain dependencies.
    pub platforms: Vec<PlatformStep>,
    /// Result of the single package manager uninstall.
    pub uninstall: Result<(), PlinthError>,
    /// Whether the project manifest was rewritten.
    pub manifest_updated: bool,
}

impl RemoveReport {
    pub fn platform_failures(&self) -> impl Iterator<Item = &PlatformStep> {
        self.platforms.iter().filter(|step| step.result.is_err())
    }

    pub fn is_clean(&self) -> bool {
        self.uninstall.is_ok() && self.platform_failures().next().is_none()
    }
}

/// Plugin lifecycle for one project.
pub struct PluginService {
    project: ProjectContext,
    config: PlinthConfig,
    package_manager: Arc<dyn PackageManager>,
    integration: Arc<dyn NativeIntegration>,
    cache: NativeBuildCache,
    lock: Mutex<()>,
}

impl PluginService {
    pub fn new(
        project: ProjectContext,
        config: PlinthConfig,
        package_manager: Arc<dyn PackageManager>,
        integration: Arc<dyn NativeIntegration>,
    ) -> Self {
        let cache = NativeBuildCache::new(integration.clone(), config.plugins.ledger_file_name.clone());
        Self {
            project,
            config,
            package_manager,
            integration,
            cache,
            lock: Mutex::new(()),
        }
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn cache(&self) -> &NativeBuildCache {
        &self.cache
    }

    fn metadata_key(&self) -> &str {
        &self.config.plugins.metadata_key
    }

    /// Install every manifest dependency missing from `node_modules`.
    ///
    /// Returns the names that were installed; empty when all were present.
    pub async fn ensure_dependencies_installed(&self) -> Result<Vec<String>, PlinthError> {
        let _guard = self.lock.lock().await;
        self.install_missing_dependencies().await
    }

    async fn install_missing_dependencies(&self) -> Result<Vec<String>, PlinthError> {
        let manifest = ProjectManifest::load(&self.project.manifest_path)?;
        let options = InstallOptions {
            save: false,
            ..self.config.install_options()
        };

        let mut installed = Vec::new();
        for entry in manifest.dependencies() {
            if self.project.package_manifest_path(&entry.name).is_file() {
                continue;
            }
            let specifier = if entry.version.is_empty() {
                entry.name.clone()
            } else {
                format!("{}@{}", entry.name, entry.version)
            };
            info!(name = %entry.name, version = %entry.version, "installing missing dependency");
            self.package_manager
                .install(&specifier, &self.project.root, &options)
                .await?;
            installed.push(entry.name);
        }
        Ok(installed)
    }

    /// The local archive `specifier` names, as given or relative to the
    /// project root. `None` for registry, URL, and git specifiers.
    fn local_archive(&self, specifier: &str) -> Option<PathBuf> {
        let candidates = [Path::new(specifier).to_path_buf(), self.project.root.join(specifier)];
        let archive = candidates.into_iter().find(|candidate| candidate.is_file())?;
        let absolute = std::path::absolute(&archive).unwrap_or(archive);
        debug!(specifier, path = %absolute.display(), "installing from local archive");
        Some(absolute)
    }

    /// Manifest value recorded for an added plugin.
    ///
    /// Archives become `file:` references (project-relative when inside the
    /// project), URL and git specifiers are kept verbatim, and registry
    /// installs pin the installed version.
    fn declared_version(&self, specifier: &str, archive: Option<&Path>, plugin: &PluginRecord) -> String {
        if let Some(archive) = archive {
            let path = archive.strip_prefix(&self.project.root).unwrap_or(archive);
            return format!("file:{}", path.to_string_lossy());
        }
        if package_name_from_specifier(specifier).is_none() {
            return specifier.trim().to_string();
        }
        plugin.version.clone()
    }

    /// Install `specifier` as a plugin.
    ///
    /// A package that turns out not to be a plugin, or whose metadata cannot
    /// be read, is uninstalled again and reported as
    /// [`PlinthError::InvalidPlugin`]. Compatibility findings never fail the
    /// install.
    pub async fn add(&self, specifier: &str) -> Result<AddReport, PlinthError> {
        let _guard = self.lock.lock().await;
        self.install_missing_dependencies().await?;

        let archive = self.local_archive(specifier);
        let install_target = archive
            .as_ref()
            .map_or_else(|| specifier.to_string(), |path| path.to_string_lossy().into_owned());
        let options = self.config.install_options();
        let installed = self
            .package_manager
            .install(&install_target, &self.project.root, &options)
            .await?;

        let plugin = match load_package(&self.project, &installed.name, self.metadata_key()) {
            Ok(Some(PackageKind::Plugin(plugin))) => plugin,
            Ok(Some(PackageKind::Dependency(_))) => {
                warn!(specifier, name = %installed.name, "not a plugin, rolling back install");
                return Err(self.roll_back(specifier, &installed.name, &options).await?);
            }
            Err(e @ PlinthError::Metadata { .. }) => {
                warn!(specifier, name = %installed.name, error = %e, "unreadable package metadata, rolling back install");
                return Err(self.roll_back(specifier, &installed.name, &options).await?);
            }
            Err(e) => return Err(e),
            Ok(None) => {
                return Err(PlinthError::PackageManager {
                    message: format!("{} is missing from node_modules after install", installed.name),
                    source: None,
                });
            }
        };

        let warnings = self.check_compatibility(&plugin)?;

        // A fresh package may carry new JavaScript under unchanged native files.
        for target in discover_platforms(&self.project) {
            if let Err(e) = self.cache.forget(&plugin.name, &target).await {
                warn!(plugin = %plugin.name, platform = %target.platform, error = %e, "could not drop native hash ledger entry");
            }
        }

        let declared = self.declared_version(specifier, archive.as_deref(), &plugin);
        let manifest_updated = manifest::add_entry(&self.project, &plugin.name, &declared, false)?;
        info!(
            name = %plugin.name,
            version = %plugin.version,
            declared = %declared,
            warnings = warnings.len(),
            "plugin installed"
        );
        Ok(AddReport {
            plugin,
            warnings,
            manifest_updated,
        })
    }

    /// Undo an install that did not yield a usable plugin.
    ///
    /// `Ok` carries the [`PlinthError::InvalidPlugin`] to report; `Err` means
    /// the rollback itself failed.
    async fn roll_back(
        &self,
        specifier: &str,
        name: &str,
        options: &InstallOptions,
    ) -> Result<PlinthError, PlinthError> {
        self.package_manager
            .uninstall(name, options, &self.project.root)
            .await?;
        manifest::remove_entry(&self.project, name)?;
        Ok(PlinthError::InvalidPlugin {
            specifier: specifier.to_string(),
        })
    }

    fn check_compatibility(&self, plugin: &PluginRecord) -> Result<Vec<CompatibilityWarning>, PlinthError> {
        let manifest = ProjectManifest::load(&self.project.manifest_path)?;
        let mut warnings = Vec::new();
        for target in discover_platforms(&self.project) {
            let platform = target.platform;
            let runtime = self.config.platforms.runtime_package(platform);
            let Some(installed) = manifest.framework_version(self.metadata_key(), runtime) else {
                debug!(plugin = %plugin.name, %platform, runtime, "framework version unknown, skipping compatibility check");
                continue;
            };
            if let Some(warning) = compat::check(plugin, platform, &installed) {
                warn!(plugin = %plugin.name, %platform, "{warning}");
                warnings.push(warning);
            }
        }
        Ok(warnings)
    }

    /// Remove the installed package `name`: native removal on every
    /// installed platform, one uninstall, then the manifest entry.
    ///
    /// Fails only when every step failed, or when the manifest cannot be
    /// rewritten after a successful uninstall.
    pub async fn remove(&self, name: &str) -> Result<RemoveReport, PlinthError> {
        let _guard = self.lock.lock().await;

        let kind = load_package(&self.project, name, self.metadata_key())?.ok_or_else(|| {
            PlinthError::PluginNotFound {
                name: name.to_string(),
            }
        })?;

        let platforms = match &kind {
            PackageKind::Plugin(plugin) => {
                let mut steps = Vec::new();
                for target in discover_platforms(&self.project) {
                    let result = self.remove_from_platform(plugin, &target).await;
                    if let Err(e) = &result {
                        warn!(plugin = %plugin.name, platform = %target.platform, error = %e, "native removal failed");
                    }
                    steps.push(PlatformStep {
                        platform: target.platform,
                        result,
                    });
                }
                steps
            }
            PackageKind::Dependency(_) => {
                debug!(name, "plain dependency, skipping native removal");
                Vec::new()
            }
        };

        let options = self.config.install_options();
        let uninstall = self
            .package_manager
            .uninstall(kind.name(), &options, &self.project.root)
            .await;

        let any_platform_ok = platforms.iter().any(|step| step.result.is_ok());
        let uninstall = match uninstall {
            Ok(()) => Ok(()),
            Err(e) if !any_platform_ok => return Err(e),
            Err(e) => {
                warn!(name, error = %e, "package manager uninstall failed");
                Err(e)
            }
        };

        let manifest_updated = if uninstall.is_ok() {
            manifest::remove_entry(&self.project, kind.name())?
        } else {
            false
        };

        info!(name, manifest_updated, "plugin removed");
        Ok(RemoveReport {
            name: kind.name().to_string(),
            platforms,
            uninstall,
            manifest_updated,
        })
    }

    async fn remove_from_platform(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
    ) -> Result<(), PlinthError> {
        self.integration.remove(plugin, target, &self.project).await?;

        let module_dir = target.module_destination().join(&plugin.name);
        if remove_path(&module_dir).map_err(|e| PlinthError::io(&module_dir, e))? {
            debug!(plugin = %plugin.name, path = %module_dir.display(), "removed plugin modules");
        }

        if let Err(e) = self.cache.forget(&plugin.name, target).await {
            warn!(plugin = %plugin.name, platform = %target.platform, error = %e, "could not drop native hash ledger entry");
        }
        Ok(())
    }

    /// Every declared dependency that is installed and classifies as a plugin.
    pub async fn list(&self) -> Result<Vec<PluginRecord>, PlinthError> {
        self.installed_plugins()
    }

    fn installed_plugins(&self) -> Result<Vec<PluginRecord>, PlinthError> {
        let manifest = ProjectManifest::load(&self.project.manifest_path)?;
        let mut plugins = Vec::new();
        for entry in manifest.dependencies() {
            match load_package(&self.project, &entry.name, self.metadata_key()) {
                Ok(Some(PackageKind::Plugin(plugin))) => plugins.push(plugin),
                Ok(Some(PackageKind::Dependency(_))) => {}
                Ok(None) => debug!(name = %entry.name, "declared dependency is not installed"),
                Err(e) => warn!(name = %entry.name, error = %e, "skipping unreadable package"),
            }
        }
        Ok(plugins)
    }

    /// Run the native build cache over every installed plugin and platform.
    pub async fn prepare(&self) -> Result<PrepareReport, PlinthError> {
        let _guard = self.lock.lock().await;
        let plugins = self.installed_plugins()?;
        let targets = discover_platforms(&self.project);
        info!(plugins = plugins.len(), platforms = targets.len(), "preparing native code");
        Ok(self.cache.prepare_all(&plugins, &targets, &self.project).await)
    }
}

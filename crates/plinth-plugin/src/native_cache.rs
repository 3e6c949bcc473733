// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental native build cache.
//!
//! Native integration (merging a plugin's `platforms/<platform>` folder into
//! the platform's native project) is expensive. Before running it, the cache
//! fingerprints every file of that folder with SHA-256 and compares the set
//! against the per-platform [`NativeHashLedger`]. Identical sets skip the
//! integration hook entirely; anything added, removed, or changed re-runs it
//! and, only on success, records the new set.
//!
//! Digests depend on file bytes and relative paths only, never on mtimes or
//! permissions, so a fresh clone of an unchanged plugin is a cache hit.
//!
//! The ledger for one platform is read-modify-written under a per-platform
//! lock held across the hook call, so concurrent prepares for the same
//! platform never lose each other's entries.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plinth_core::{
    NativeIntegration, PlatformId, PlatformTarget, PlinthError, PluginRecord, ProjectContext,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::fs::write_atomic;

/// Relative file path (`/`-separated) to lowercase hex SHA-256 digest.
pub type FileDigests = BTreeMap<String, String>;

/// Persisted per-platform record of the digests each plugin was last
/// successfully integrated with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHashLedger {
    plugins: BTreeMap<String, FileDigests>,
}

impl NativeHashLedger {
    /// Load the ledger at `path`.
    ///
    /// A missing file is an empty ledger. A corrupt file is also treated as
    /// empty (with a warning), which forces full re-integration.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable native hash ledger, treating as empty");
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt native hash ledger, treating as empty");
                Self::default()
            }
        }
    }

    /// Persist atomically to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PlinthError> {
        let body = serde_json::to_string_pretty(self).map_err(|e| PlinthError::Ledger {
            path: path.to_path_buf(),
            message: format!("failed to serialize: {e}"),
        })?;
        write_atomic(path, body.as_bytes()).map_err(|e| PlinthError::Ledger {
            path: path.to_path_buf(),
            message: format!("failed to write: {e}"),
        })
    }

    pub fn get(&self, plugin: &str) -> Option<&FileDigests> {
        self.plugins.get(plugin)
    }

    pub fn set(&mut self, plugin: &str, digests: FileDigests) {
        self.plugins.insert(plugin.to_string(), digests);
    }

    /// Drop `plugin`'s entry. Returns whether it existed.
    pub fn remove(&mut self, plugin: &str) -> bool {
        self.plugins.remove(plugin).is_some()
    }

    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Hash every regular file under `root`, recursively.
pub fn hash_native_folder(root: &Path) -> std::io::Result<FileDigests> {
    let mut digests = FileDigests::new();
    hash_into(root, root, &mut digests)?;
    Ok(digests)
}

fn hash_into(root: &Path, dir: &Path, digests: &mut FileDigests) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            hash_into(root, &path, digests)?;
        } else if path.is_file() {
            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            digests.insert(relative, hash_file(&path)?);
        }
    }
    Ok(())
}

fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// What a prepare pass did for one (plugin, platform) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// The plugin has no native folder for the platform.
    NoNativeCode,
    /// Digests matched the ledger; the hook was not called.
    Skipped,
    /// The hook ran and the ledger was updated.
    Integrated,
}

/// Outcome of one pair within a multi-plugin sweep.
#[derive(Debug)]
pub struct PrepareEntry {
    pub plugin: String,
    pub platform: PlatformId,
    pub outcome: Result<PrepareOutcome, PlinthError>,
}

/// Aggregated result of [`NativeBuildCache::prepare_all`].
#[derive(Debug, Default)]
pub struct PrepareReport {
    pub entries: Vec<PrepareEntry>,
}

impl PrepareReport {
    pub fn count(&self, outcome: PrepareOutcome) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.outcome, Ok(o) if *o == outcome))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PrepareEntry> {
        self.entries.iter().filter(|e| e.outcome.is_err())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Gates calls to the native integration hook on content digests.
///
/// Sole owner of the per-platform ledgers: nothing else reads or writes them.
pub struct NativeBuildCache {
    integration: Arc<dyn NativeIntegration>,
    ledger_file_name: String,
    locks: HashMap<PlatformId, Mutex<()>>,
}

impl NativeBuildCache {
    pub fn new(integration: Arc<dyn NativeIntegration>, ledger_file_name: impl Into<String>) -> Self {
        Self {
            integration,
            ledger_file_name: ledger_file_name.into(),
            locks: PlatformId::ALL
                .into_iter()
                .map(|platform| (platform, Mutex::new(())))
                .collect(),
        }
    }

    /// Ledger location for `target`.
    pub fn ledger_path(&self, target: &PlatformTarget) -> PathBuf {
        target.ledger_path(&self.ledger_file_name)
    }

    /// Read the ledger for `target` (missing or corrupt reads as empty).
    pub fn ledger(&self, target: &PlatformTarget) -> NativeHashLedger {
        NativeHashLedger::load(&self.ledger_path(target))
    }

    fn lock(&self, platform: PlatformId) -> Result<&Mutex<()>, PlinthError> {
        self.locks
            .get(&platform)
            .ok_or_else(|| PlinthError::Internal(format!("no ledger lock for {platform}")))
    }

    /// Integrate `plugin` into `target` unless its native files are unchanged
    /// since the last successful integration.
    pub async fn prepare_native_code(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        project: &ProjectContext,
    ) -> Result<PrepareOutcome, PlinthError> {
        let platform = target.platform;
        let native_dir = plugin.native_folder_path(platform);
        if !native_dir.is_dir() {
            debug!(plugin = %plugin.name, %platform, "no native code for platform");
            return Ok(PrepareOutcome::NoNativeCode);
        }

        let dir = native_dir.clone();
        let digests = tokio::task::spawn_blocking(move || hash_native_folder(&dir))
            .await
            .map_err(|e| PlinthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| PlinthError::io(&native_dir, e))?;

        let _guard = self.lock(platform)?.lock().await;
        let ledger_path = self.ledger_path(target);
        let mut ledger = NativeHashLedger::load(&ledger_path);

        if ledger.get(&plugin.name) == Some(&digests) {
            debug!(plugin = %plugin.name, %platform, files = digests.len(), "native code unchanged, skipping integration");
            return Ok(PrepareOutcome::Skipped);
        }

        info!(plugin = %plugin.name, %platform, files = digests.len(), "integrating native code");
        self.integration.integrate(plugin, target, project).await?;

        ledger.set(&plugin.name, digests);
        ledger.save(&ledger_path)?;
        Ok(PrepareOutcome::Integrated)
    }

    /// Prepare every plugin on every target, in target order.
    ///
    /// Failures are recorded per pair and never abort the sweep.
    pub async fn prepare_all(
        &self,
        plugins: &[PluginRecord],
        targets: &[PlatformTarget],
        project: &ProjectContext,
    ) -> PrepareReport {
        let mut report = PrepareReport::default();
        for target in targets {
            for plugin in plugins {
                let outcome = self.prepare_native_code(plugin, target, project).await;
                if let Err(e) = &outcome {
                    warn!(plugin = %plugin.name, platform = %target.platform, error = %e, "native prepare failed");
                }
                report.entries.push(PrepareEntry {
                    plugin: plugin.name.clone(),
                    platform: target.platform,
                    outcome,
                });
            }
        }
        report
    }

    /// Drop `plugin`'s ledger entry for `target`, so a reinstall integrates again.
    ///
    /// Returns whether an entry existed. The file is written only if so.
    pub async fn forget(&self, plugin: &str, target: &PlatformTarget) -> Result<bool, PlinthError> {
        let _guard = self.lock(target.platform)?.lock().await;
        let ledger_path = self.ledger_path(target);
        let mut ledger = NativeHashLedger::load(&ledger_path);
        if !ledger.remove(plugin) {
            return Ok(false);
        }
        ledger.save(&ledger_path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_test_utils::{MockNativeIntegration, ProjectFixture};
    use tracing_test::traced_test;

    struct Setup {
        fixture: ProjectFixture,
        native: Arc<MockNativeIntegration>,
        cache: NativeBuildCache,
        plugin: PluginRecord,
    }

    fn setup(name: &str) -> Setup {
        let fixture = ProjectFixture::new().with_platform(PlatformId::Android);
        let native = Arc::new(MockNativeIntegration::new());
        let cache = NativeBuildCache::new(native.clone(), ".plugin-hashes.json");
        let plugin = PluginRecord {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            full_path: fixture.root().join("node_modules").join(name),
            min_versions: Default::default(),
            variables: Default::default(),
        };
        fixture.write_file(
            &format!("node_modules/{name}/platforms/android/AndroidManifest.xml"),
            b"<manifest/>",
        );
        fixture.write_file(
            &format!("node_modules/{name}/platforms/android/libs/lib.aar"),
            &[0u8, 1, 2, 3],
        );
        Setup {
            fixture,
            native,
            cache,
            plugin,
        }
    }

    #[tokio::test]
    async fn missing_ledger_integrates_once_and_records_files() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        assert!(!s.cache.ledger_path(&target).exists());

        let outcome = s
            .cache
            .prepare_native_code(&s.plugin, &target, &s.fixture.project)
            .await
            .unwrap();
        assert_eq!(outcome, PrepareOutcome::Integrated);
        assert_eq!(s.native.integrate_count("foo", PlatformId::Android).await, 1);

        let ledger = s.cache.ledger(&target);
        let files = ledger.get("foo").expect("ledger has foo");
        let keys: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["AndroidManifest.xml", "libs/lib.aar"]);
    }

    #[tokio::test]
    async fn unchanged_files_skip_integration() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        let project = &s.fixture.project;

        s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();
        let second = s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();

        assert_eq!(second, PrepareOutcome::Skipped);
        assert_eq!(s.native.integrate_count("foo", PlatformId::Android).await, 1);
    }

    #[tokio::test]
    async fn one_changed_byte_reintegrates_exactly_once() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        let project = &s.fixture.project;

        s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();
        let before = s.cache.ledger(&target).get("foo").cloned().unwrap();

        s.fixture.write_file(
            "node_modules/foo/platforms/android/libs/lib.aar",
            &[0u8, 1, 2, 4],
        );
        let outcome = s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();
        assert_eq!(outcome, PrepareOutcome::Integrated);
        assert_eq!(s.native.integrate_count("foo", PlatformId::Android).await, 2);

        let after = s.cache.ledger(&target).get("foo").cloned().unwrap();
        assert_ne!(before["libs/lib.aar"], after["libs/lib.aar"]);
        assert_eq!(before["AndroidManifest.xml"], after["AndroidManifest.xml"]);

        s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();
        assert_eq!(s.native.integrate_count("foo", PlatformId::Android).await, 2);
    }

    #[tokio::test]
    async fn added_and_removed_files_reintegrate() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        let project = &s.fixture.project;
        s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();

        s.fixture.write_file("node_modules/foo/platforms/android/res/values.xml", b"<r/>");
        assert_eq!(
            s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap(),
            PrepareOutcome::Integrated
        );

        std::fs::remove_file(
            s.fixture
                .root()
                .join("node_modules/foo/platforms/android/res/values.xml"),
        )
        .unwrap();
        assert_eq!(
            s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap(),
            PrepareOutcome::Integrated
        );
        assert_eq!(s.native.integrate_count("foo", PlatformId::Android).await, 3);
    }

    #[tokio::test]
    async fn failed_integration_leaves_ledger_untouched() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        s.native.fail_on(PlatformId::Android).await;

        let err = s
            .cache
            .prepare_native_code(&s.plugin, &target, &s.fixture.project)
            .await
            .unwrap_err();
        assert!(matches!(err, PlinthError::NativeIntegration { .. }));
        assert!(s.cache.ledger(&target).get("foo").is_none());

        s.native.clear_failures().await;
        let retry = s
            .cache
            .prepare_native_code(&s.plugin, &target, &s.fixture.project)
            .await
            .unwrap();
        assert_eq!(retry, PrepareOutcome::Integrated);
    }

    #[tokio::test]
    async fn plugin_without_native_folder_is_a_no_op() {
        let s = setup("foo");
        let ios = s.fixture.target(PlatformId::Ios);
        let outcome = s
            .cache
            .prepare_native_code(&s.plugin, &ios, &s.fixture.project)
            .await
            .unwrap();
        assert_eq!(outcome, PrepareOutcome::NoNativeCode);
        assert_eq!(s.native.total_integrations().await, 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn corrupt_ledger_is_treated_as_empty() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        std::fs::write(s.cache.ledger_path(&target), b"{ not json").unwrap();

        let outcome = s
            .cache
            .prepare_native_code(&s.plugin, &target, &s.fixture.project)
            .await
            .unwrap();
        assert_eq!(outcome, PrepareOutcome::Integrated);
        assert!(logs_contain("corrupt native hash ledger"));
        assert!(s.cache.ledger(&target).get("foo").is_some());
    }

    #[tokio::test]
    async fn digests_ignore_mtime() {
        let s = setup("foo");
        let dir = s.plugin.native_folder_path(PlatformId::Android);
        let first = hash_native_folder(&dir).unwrap();
        // Rewrite identical bytes: new mtime, same content.
        s.fixture
            .write_file("node_modules/foo/platforms/android/AndroidManifest.xml", b"<manifest/>");
        assert_eq!(hash_native_folder(&dir).unwrap(), first);
    }

    #[tokio::test]
    async fn prepare_all_aggregates_failures() {
        let s = setup("foo");
        let fixture = s.fixture.with_platform(PlatformId::Ios);
        fixture.write_file("node_modules/foo/platforms/ios/Info.plist", b"<plist/>");
        s.native.fail_on(PlatformId::Android).await;

        let targets = vec![
            fixture.target(PlatformId::Android),
            fixture.target(PlatformId::Ios),
        ];
        let report = s
            .cache
            .prepare_all(std::slice::from_ref(&s.plugin), &targets, &fixture.project)
            .await;

        assert_eq!(report.entries.len(), 2);
        assert!(report.has_failures());
        assert_eq!(report.count(PrepareOutcome::Integrated), 1);
        assert_eq!(s.native.integrate_count("foo", PlatformId::Ios).await, 1);
    }

    #[tokio::test]
    async fn forget_drops_entry_so_next_prepare_integrates() {
        let s = setup("foo");
        let target = s.fixture.target(PlatformId::Android);
        let project = &s.fixture.project;
        s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap();

        assert!(s.cache.forget("foo", &target).await.unwrap());
        assert!(!s.cache.forget("foo", &target).await.unwrap());
        assert_eq!(
            s.cache.prepare_native_code(&s.plugin, &target, project).await.unwrap(),
            PrepareOutcome::Integrated
        );
    }

    #[test]
    fn ledger_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = NativeHashLedger::default();
        ledger.set(
            "foo",
            FileDigests::from([("a.txt".to_string(), "00ff".to_string())]),
        );
        ledger.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["foo"]["a.txt"], "00ff");
        assert_eq!(NativeHashLedger::load(&path), ledger);
    }
}

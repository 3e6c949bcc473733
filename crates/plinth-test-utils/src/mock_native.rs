// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock native integration hook.
//!
//! `MockNativeIntegration` records every `integrate`/`remove` call and can be
//! told to fail for specific platforms.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use plinth_core::{
    NativeIntegration, PlatformId, PlatformTarget, PlinthError, PluginRecord, ProjectContext,
};

/// A captured native hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Integrate { plugin: String, platform: PlatformId },
    Remove { plugin: String, platform: PlatformId },
}

/// A native integration hook that only records calls.
pub struct MockNativeIntegration {
    calls: Mutex<Vec<NativeCall>>,
    failing: Mutex<HashSet<PlatformId>>,
}

impl MockNativeIntegration {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every hook call for `platform` fail until cleared.
    pub async fn fail_on(&self, platform: PlatformId) {
        self.failing.lock().await.insert(platform);
    }

    /// Stop failing for every platform.
    pub async fn clear_failures(&self) {
        self.failing.lock().await.clear();
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().await.clone()
    }

    /// Number of `integrate` calls for `plugin` on `platform`.
    pub async fn integrate_count(&self, plugin: &str, platform: PlatformId) -> usize {
        let expected = NativeCall::Integrate {
            plugin: plugin.to_string(),
            platform,
        };
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| **call == expected)
            .count()
    }

    /// Total number of `integrate` calls.
    pub async fn total_integrations(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, NativeCall::Integrate { .. }))
            .count()
    }

    /// Platforms `remove` was called for, in order.
    pub async fn removed_platforms(&self) -> Vec<PlatformId> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                NativeCall::Remove { platform, .. } => Some(*platform),
                NativeCall::Integrate { .. } => None,
            })
            .collect()
    }

    async fn outcome(&self, plugin: &PluginRecord, platform: PlatformId) -> Result<(), PlinthError> {
        if self.failing.lock().await.contains(&platform) {
            return Err(PlinthError::NativeIntegration {
                plugin: plugin.name.clone(),
                platform: platform.to_string(),
                message: "mock native build failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockNativeIntegration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NativeIntegration for MockNativeIntegration {
    async fn integrate(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        _project: &ProjectContext,
    ) -> Result<(), PlinthError> {
        self.calls.lock().await.push(NativeCall::Integrate {
            plugin: plugin.name.clone(),
            platform: target.platform,
        });
        self.outcome(plugin, target.platform).await
    }

    async fn remove(
        &self,
        plugin: &PluginRecord,
        target: &PlatformTarget,
        _project: &ProjectContext,
    ) -> Result<(), PlinthError> {
        self.calls.lock().await.push(NativeCall::Remove {
            plugin: plugin.name.clone(),
            platform: target.platform,
        });
        self.outcome(plugin, target.platform).await
    }
}

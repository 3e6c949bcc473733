// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::PlinthConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &PlinthConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.general.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level `{}` must be one of {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.npm.binary.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "npm.binary must not be empty".to_string(),
        });
    }

    if config.plugins.metadata_key.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "plugins.metadata_key must not be empty".to_string(),
        });
    }

    let ledger = config.plugins.ledger_file_name.trim();
    if ledger.is_empty() || ledger.contains('/') || ledger.contains('\\') {
        errors.push(ConfigError::Validation {
            message: format!(
                "plugins.ledger_file_name `{ledger}` must be a plain file name"
            ),
        });
    }

    for (key, runtime) in [
        ("platforms.android_runtime", &config.platforms.android_runtime),
        ("platforms.ios_runtime", &config.platforms.ios_runtime),
    ] {
        if runtime.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

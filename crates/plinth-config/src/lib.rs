// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Plinth plugin manager.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use plinth_config::load_and_validate;
//!
//! let config = load_and_validate(std::path::Path::new(".")).expect("config errors");
//! println!("plugin metadata key: {}", config.plugins.metadata_key);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PlinthConfig;

/// Load configuration from the XDG hierarchy plus `<project_root>/plinth.toml`
/// and validate it.
///
/// Returns either a valid `PlinthConfig` or every diagnostic collected.
pub fn load_and_validate(project_root: &std::path::Path) -> Result<PlinthConfig, Vec<ConfigError>> {
    finish(loader::load_config(project_root))
}

/// Load configuration from a specific file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<PlinthConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path))
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<PlinthConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

#[allow(clippy::result_large_err)]
fn finish(
    loaded: Result<PlinthConfig, figment::Error>,
) -> Result<PlinthConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                metadata_key = %config.plugins.metadata_key,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Plinth plugin manager.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum PlinthError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The installed package carries no native-integration metadata.
    #[error("{specifier} is not a valid plugin")]
    InvalidPlugin { specifier: String },

    /// The named plugin is not installed in the project.
    #[error("plugin not installed: {name}")]
    PluginNotFound { name: String },

    /// Package metadata could not be classified (missing name, malformed JSON).
    #[error("invalid package metadata at {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Package manager install/uninstall failure.
    #[error("package manager error: {message}")]
    PackageManager {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A platform's native integration or removal hook failed.
    #[error("native integration failed for {plugin} on {platform}: {message}")]
    NativeIntegration {
        plugin: String,
        platform: String,
        message: String,
    },

    /// The native hash ledger could not be persisted.
    #[error("ledger error at {path}: {message}")]
    Ledger { path: PathBuf, message: String },

    /// The project manifest could not be read or written.
    #[error("manifest error at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Filesystem errors outside the manifest and ledger.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlinthError {
    /// Wrap an `std::io::Error` with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlinthError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that must abort the whole add/remove operation.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PlinthError::NativeIntegration { .. } | PlinthError::Ledger { .. }
        )
    }
}

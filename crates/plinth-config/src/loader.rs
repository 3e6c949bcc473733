// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `<project>/plinth.toml` > `~/.config/plinth/plinth.toml` > `/etc/plinth/plinth.toml`
//! with environment variable overrides via `PLINTH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PlinthConfig;

/// Name of the configuration file looked up in every layer.
pub const CONFIG_FILE_NAME: &str = "plinth.toml";

/// Candidate config files, lowest precedence first. The last one lives in
/// the project root.
pub fn config_file_candidates(project_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/plinth").join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("plinth").join(CONFIG_FILE_NAME));
    }
    paths.push(project_root.join(CONFIG_FILE_NAME));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/plinth/plinth.toml` (system-wide)
/// 3. `~/.config/plinth/plinth.toml` (user XDG config)
/// 4. `<project_root>/plinth.toml` (project)
/// 5. `PLINTH_*` environment variables
pub fn load_config(project_root: &Path) -> Result<PlinthConfig, figment::Error> {
    build_figment(project_root).extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PlinthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlinthConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PlinthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlinthConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment(project_root: &Path) -> Figment {
    config_file_candidates(project_root)
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(PlinthConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider mapping `PLINTH_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after the section name is a separator, so
/// `PLINTH_NPM_IGNORE_SCRIPTS` maps to `npm.ignore_scripts`.
fn env_provider() -> Env {
    Env::prefixed("PLINTH_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["general_", "npm_", "plugins_", "platforms_"]
            .iter()
            .find(|prefix| key_str.starts_with(*prefix))
            .map(|prefix| {
                let section = prefix.trim_end_matches('_');
                format!("{section}.{}", &key_str[prefix.len()..])
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PLINTH_NPM_IGNORE_SCRIPTS", "true");
            jail.set_env("PLINTH_PLUGINS_METADATA_KEY", "native");
            let config: PlinthConfig = Figment::new()
                .merge(Serialized::defaults(PlinthConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert!(config.npm.ignore_scripts);
            assert_eq!(config.plugins.metadata_key, "native");
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                "[npm]\nbinary = \"pnpm\"\n",
            )?;
            let config = load_config_from_path(Path::new(CONFIG_FILE_NAME))?;
            assert_eq!(config.npm.binary, "pnpm");
            assert_eq!(config.general.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn project_file_is_read_from_project_root() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "[npm]\nbinary = \"yarn\"\n")?;
            jail.create_dir("app")?;
            jail.create_file(
                Path::new("app").join(CONFIG_FILE_NAME),
                "[npm]\nbinary = \"pnpm\"\n",
            )?;
            let config = load_config(Path::new("app"))?;
            assert_eq!(config.npm.binary, "pnpm");
            Ok(())
        });
    }

    #[test]
    fn working_directory_file_is_not_the_project_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "[npm]\nbinary = \"yarn\"\n")?;
            jail.create_dir("app")?;
            let candidates = config_file_candidates(Path::new("app"));
            assert_eq!(candidates.last(), Some(&Path::new("app").join(CONFIG_FILE_NAME)));
            assert!(!candidates.contains(&PathBuf::from(CONFIG_FILE_NAME)));
            Ok(())
        });
    }
}

// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Plinth configuration system.

use plinth_config::diagnostic::ConfigError;
use plinth_config::{load_and_validate_str, load_config_from_str};
use plinth_core::PlatformId;

#[test]
fn valid_toml_deserializes_into_plinth_config() {
    let toml = r#"
[general]
log_level = "debug"

[npm]
binary = "/usr/local/bin/npm"
disable_npm_install = true
ignore_scripts = true
framework_path = "/tmp/tns-android.tgz"

[plugins]
metadata_key = "native"
ledger_file_name = ".hashes.json"

[platforms]
ios_runtime = "ios-runtime"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.npm.binary, "/usr/local/bin/npm");
    assert!(config.npm.disable_npm_install);
    assert!(config.npm.ignore_scripts);
    assert_eq!(config.plugins.metadata_key, "native");
    assert_eq!(config.plugins.ledger_file_name, ".hashes.json");
    assert_eq!(config.platforms.runtime_package(PlatformId::Ios), "ios-runtime");
    assert_eq!(
        config.platforms.runtime_package(PlatformId::Android),
        "tns-android"
    );

    let options = config.install_options();
    assert!(options.save);
    assert!(options.disable_npm_install);
    assert!(options.ignore_scripts);
    assert_eq!(
        options.framework_path.as_deref(),
        Some(std::path::Path::new("/tmp/tns-android.tgz"))
    );
    assert!(options.path.is_none());
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.npm.binary, "npm");
    assert_eq!(config.plugins.metadata_key, "nativescript");
    assert_eq!(config.plugins.ledger_file_name, ".plugin-hashes.json");
    assert!(!config.npm.disable_npm_install);
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[npm]
ignore_scrpts = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "ignore_scripts"
    )));
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[npm]
ignore_scripts = "yes please"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string for bool");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[general]
log_level = "chatty"
"#;

    let errors = load_and_validate_str(toml).expect_err("bad log level");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
}

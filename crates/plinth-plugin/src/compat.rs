// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin vs. platform framework version compatibility.
//!
//! The check is advisory: callers log the warning and carry on.

use std::fmt;

use plinth_core::{PlatformId, PluginRecord};
use semver::Version;
use tracing::warn;

/// Why a plugin may not work with a platform's installed framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityWarning {
    /// The plugin declares no minimum version for the platform.
    Unsupported { plugin: String, platform: PlatformId },
    /// The declared minimum is newer than the installed framework.
    Outdated {
        plugin: String,
        platform: PlatformId,
        required: String,
        installed: String,
    },
    /// One of the two versions is not a semantic version.
    Unparsable {
        plugin: String,
        platform: PlatformId,
        version: String,
    },
}

impl CompatibilityWarning {
    pub fn platform(&self) -> PlatformId {
        match self {
            CompatibilityWarning::Unsupported { platform, .. }
            | CompatibilityWarning::Outdated { platform, .. }
            | CompatibilityWarning::Unparsable { platform, .. } => *platform,
        }
    }
}

impl fmt::Display for CompatibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityWarning::Unsupported { plugin, platform } => {
                write!(f, "{plugin} is not supported for platform {platform}")
            }
            CompatibilityWarning::Outdated {
                plugin,
                platform,
                required,
                installed,
            } => write!(
                f,
                "{plugin} requires {platform} runtime version {required} or newer, \
                 installed version is {installed}"
            ),
            CompatibilityWarning::Unparsable {
                plugin,
                platform,
                version,
            } => write!(
                f,
                "cannot compare {plugin} against {platform}: `{version}` is not a valid version"
            ),
        }
    }
}

/// Parse a version, accepting `v`/`^`/`~`/`=` prefixes and missing
/// minor/patch components (`6` and `6.0` both mean `6.0.0`).
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let trimmed = raw
        .trim()
        .trim_start_matches(['v', 'V', '^', '~', '=', '>', ' ']);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split);
    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    parts.resize(3, "0");
    Version::parse(&format!("{}{suffix}", parts.join("."))).ok()
}

/// Compare `plugin`'s declared minimum for `platform` with `installed`.
///
/// Returns `None` when compatible.
pub fn check(
    plugin: &PluginRecord,
    platform: PlatformId,
    installed: &str,
) -> Option<CompatibilityWarning> {
    let Some(required) = plugin.min_version(platform) else {
        return Some(CompatibilityWarning::Unsupported {
            plugin: plugin.name.clone(),
            platform,
        });
    };

    let unparsable = |version: &str| CompatibilityWarning::Unparsable {
        plugin: plugin.name.clone(),
        platform,
        version: version.to_string(),
    };
    let Some(required_version) = parse_lenient(required) else {
        return Some(unparsable(required));
    };
    let Some(installed_version) = parse_lenient(installed) else {
        return Some(unparsable(installed));
    };

    if required_version > installed_version {
        return Some(CompatibilityWarning::Outdated {
            plugin: plugin.name.clone(),
            platform,
            required: required.to_string(),
            installed: installed.to_string(),
        });
    }
    None
}

/// Whether `plugin` declares support for `platform` at `installed`.
///
/// Emits a warning for every incompatibility; never fails.
pub fn is_compatible(plugin: &PluginRecord, platform: PlatformId, installed: &str) -> bool {
    match check(plugin, platform, installed) {
        None => true,
        Some(warning) => {
            warn!(plugin = %plugin.name, %platform, "{warning}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use tracing_test::traced_test;

    fn plugin(min_versions: &[(&str, &str)]) -> PluginRecord {
        PluginRecord {
            name: "nativescript-camera".into(),
            version: "1.0.0".into(),
            full_path: PathBuf::from("/p"),
            min_versions: min_versions
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            variables: Default::default(),
        }
    }

    #[test]
    #[traced_test]
    fn newer_requirement_is_incompatible_and_warns() {
        let p = plugin(&[("ios", "6.0.0")]);
        assert!(!is_compatible(&p, PlatformId::Ios, "5.2.0"));
        assert!(logs_contain("6.0.0"));
        assert!(logs_contain("5.2.0"));
    }

    #[test]
    #[traced_test]
    fn missing_platform_is_unsupported() {
        let p = plugin(&[("ios", "6.0.0")]);
        assert!(!is_compatible(&p, PlatformId::Android, "6.0.0"));
        assert!(logs_contain("not supported for platform android"));
    }

    #[test]
    fn equal_or_older_requirement_is_compatible() {
        let p = plugin(&[("android", "3.0.0")]);
        assert!(is_compatible(&p, PlatformId::Android, "3.0.0"));
        assert!(is_compatible(&p, PlatformId::Android, "4.1.2"));
    }

    #[test]
    fn outdated_warning_carries_both_versions() {
        let p = plugin(&[("ios", "6.0.0")]);
        let warning = check(&p, PlatformId::Ios, "5.2.0").unwrap();
        assert_eq!(
            warning,
            CompatibilityWarning::Outdated {
                plugin: "nativescript-camera".into(),
                platform: PlatformId::Ios,
                required: "6.0.0".into(),
                installed: "5.2.0".into(),
            }
        );
        assert_eq!(warning.platform(), PlatformId::Ios);
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(parse_lenient("6"), Some(Version::new(6, 0, 0)));
        assert_eq!(parse_lenient("^2.1"), Some(Version::new(2, 1, 0)));
        assert_eq!(parse_lenient("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(
            parse_lenient("3.0-rc.1").map(|v| v.pre.to_string()),
            Some("rc.1".to_string())
        );
        assert_eq!(parse_lenient("latest"), None);
        assert_eq!(parse_lenient("1..2"), None);
    }

    #[test]
    fn prerelease_of_next_major_exceeds_current() {
        let p = plugin(&[("android", "6.0.0-rc.1")]);
        assert!(matches!(
            check(&p, PlatformId::Android, "5.4.0"),
            Some(CompatibilityWarning::Outdated { .. })
        ));
    }

    #[test]
    fn garbage_version_is_reported() {
        let p = plugin(&[("android", "next")]);
        assert!(matches!(
            check(&p, PlatformId::Android, "5.0.0"),
            Some(CompatibilityWarning::Unparsable { version, .. }) if version == "next"
        ));
    }
}

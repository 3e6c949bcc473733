// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installed platform discovery.

use plinth_core::{PlatformId, PlatformTarget, ProjectContext};
use tracing::debug;

/// One target per platform whose native project directory exists under the
/// project's platforms directory, in [`PlatformId::ALL`] order.
pub fn discover_platforms(project: &ProjectContext) -> Vec<PlatformTarget> {
    let targets: Vec<PlatformTarget> = PlatformId::ALL
        .into_iter()
        .map(|platform| PlatformTarget::for_project(platform, project))
        .filter(|target| target.native_project_root.is_dir())
        .collect();
    debug!(
        platforms = ?targets.iter().map(|t| t.platform).collect::<Vec<_>>(),
        "discovered installed platforms"
    );
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_test_utils::ProjectFixture;

    #[test]
    fn no_platforms_directory_means_no_targets() {
        let fixture = ProjectFixture::new();
        assert!(discover_platforms(&fixture.project).is_empty());
    }

    #[test]
    fn targets_follow_enumeration_order() {
        let fixture = ProjectFixture::new()
            .with_platform(PlatformId::Ios)
            .with_platform(PlatformId::Android);
        let platforms: Vec<PlatformId> = discover_platforms(&fixture.project)
            .into_iter()
            .map(|t| t.platform)
            .collect();
        assert_eq!(platforms, vec![PlatformId::Android, PlatformId::Ios]);
    }

    #[test]
    fn stray_file_is_not_a_platform() {
        let fixture = ProjectFixture::new();
        fixture.write_file("platforms/android", b"not a directory");
        assert!(discover_platforms(&fixture.project).is_empty());
    }
}

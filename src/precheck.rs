//! Per-platform prerequisites that must be on disk before a build starts.

use anyhow::{Result, bail};
use std::path::Path;

use crate::config::BuildConfig;
use crate::platform::Platform;

/// Verify the local prerequisites for `platform`.
///
/// Only osx has one: the extracted Xcode SDK archive in the cache directory.
/// A relative cache directory is taken from `cwd`, the same way the build
/// mounts it.
pub fn check_platform(platform: Platform, config: &BuildConfig, cwd: &Path) -> Result<()> {
    match platform {
        Platform::Osx => {
            let path = config.macos_sdk_path(cwd);
            if !path.is_file() {
                bail!(
                    "Xcode file {} does not exist in cache, OSX build not available.",
                    path.display()
                );
            }
            Ok(())
        }
        Platform::Win | Platform::Linux => Ok(()),
    }
}

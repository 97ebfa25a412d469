//! Copying canonical config files into the target

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::presets::FileSet;
use crate::system::System;

/// Copy every file in `files` from `config_dir` into `root`
///
/// Missing sources and existing destinations (without `force`) are logged
/// and skipped. Returns the destinations that were written.
///
/// # Errors
///
/// Returns an error if a copy fails
pub fn install_configs(
    system: &dyn System,
    config_dir: &Path,
    root: &Path,
    files: &FileSet,
    force: bool,
) -> Result<Vec<PathBuf>> {
    let mut installed = Vec::new();

    for file in files {
        let src = config_dir.join(file);
        let dst = root.join(file);

        if !system.is_file(&src) {
            warn!("skip: missing {}", src.display());
            continue;
        }
        if system.exists(&dst) && !force {
            warn!("skip: exists {} (use --force)", dst.display());
            continue;
        }

        system.copy(&src, &dst).map_err(|err| {
            SyncError::filesystem(format!(
                "Failed to copy {} to {}: {err}",
                src.display(),
                dst.display()
            ))
        })?;
        info!("install: {}", dst.display());
        installed.push(dst);
    }

    Ok(installed)
}

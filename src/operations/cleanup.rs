//! Removal of legacy config files

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use super::scan::list_repository_files;
use crate::git::Git;
use crate::presets::{FileSet, PresetSet};
use crate::system::System;

/// Remove legacy config files of the selected presets anywhere in `root`
///
/// A root-level file whose name is in `keep` survives, since it is about to
/// be (re)installed. Failed removals are logged and skipped. Returns the
/// removed paths.
///
/// # Errors
///
/// Returns an error if the repository files cannot be listed
pub fn remove_legacy_configs(
    system: &dyn System,
    git: &Git<'_>,
    root: &Path,
    presets: &PresetSet,
    keep: &FileSet,
) -> Result<Vec<PathBuf>> {
    let names: BTreeSet<&str> = presets
        .iter()
        .flat_map(|preset| preset.legacy_files().iter().copied())
        .collect();
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();

    for file in list_repository_files(system, git, root, true)? {
        let Ok(rel) = file.strip_prefix(root) else {
            continue;
        };
        let Some(base) = rel.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !names.contains(base) {
            continue;
        }
        let at_root = rel.parent().is_none_or(|parent| parent.as_os_str().is_empty());
        if at_root && keep.contains(base) {
            continue;
        }

        match system.remove_file(&file) {
            Ok(()) => {
                info!("remove: {}", file.display());
                removed.push(file);
            }
            Err(err) => warn!("failed to remove {}: {err}", file.display()),
        }
    }

    Ok(removed)
}

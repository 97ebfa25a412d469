//! Patchers for files that depend on the installed configs
//!
//! Each patcher is idempotent: a second run with the same inputs writes
//! nothing and reports nothing.

pub mod deps;
pub mod justfile;
pub mod precommit;
pub mod prettier;
pub mod sqlfluff;
pub mod workflow;

pub use deps::{PackageManager, PluginResult, detect_package_manager, ensure_prettier_plugins};
pub use justfile::{JustMode, update_justfile};
pub use precommit::update_precommit_config;
pub use prettier::update_prettier_plugins;
pub use sqlfluff::ensure_sqlfluff_exclude;
pub use workflow::update_sync_workflow;

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::warn;

use crate::error::SyncError;
use crate::system::System;

/// First line of every file generated and owned by this tool
pub const OWNERSHIP_MARKER: &str = "# format-configs";

/// Whether the file at `path` may be (re)generated
///
/// Absent files and files starting with [`OWNERSHIP_MARKER`] are ours;
/// anything else needs `force` and is otherwise reported and left alone.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read
pub(crate) fn may_overwrite(system: &dyn System, path: &Path, force: bool) -> Result<bool> {
    if force || !system.exists(path) {
        return Ok(true);
    }

    let existing = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if existing.lines().next().map(str::trim) == Some(OWNERSHIP_MARKER) {
        return Ok(true);
    }

    warn!("skip: exists {} (use --force)", path.display());
    Ok(false)
}

/// Write `content` to `path` unless it already holds exactly that
///
/// Returns whether the file was written.
///
/// # Errors
///
/// Returns an error if the file or its parent directory cannot be written
pub(crate) fn write_if_changed(system: &dyn System, path: &Path, content: &str) -> Result<bool> {
    if system
        .read_to_string(path)
        .is_ok_and(|existing| existing == content)
    {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        system.create_dir_all(parent).map_err(|err| {
            SyncError::filesystem(format!("Failed to create {}: {err}", parent.display()))
        })?;
    }
    system
        .write(path, content.as_bytes())
        .map_err(|err| SyncError::filesystem(format!("Failed to write {}: {err}", path.display())))?;
    Ok(true)
}

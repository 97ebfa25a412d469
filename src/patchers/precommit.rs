//! Pre-commit hook configuration
//!
//! Generates `.pre-commit-config.yaml` with one local hook per preset and
//! asks `prek` to install the git hook.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{OWNERSHIP_MARKER, may_overwrite, write_if_changed};
use crate::presets::{HookSpec, PresetSet};
use crate::system::System;

pub const PRECOMMIT_CONFIG: &str = ".pre-commit-config.yaml";

/// Top-level pre-commit document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreCommitConfig {
    pub repos: Vec<HookRepo>,
}

/// A hook repository entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRepo {
    pub repo: String,
    pub hooks: Vec<Hook>,
}

/// A single hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub id: String,
    pub name: String,
    pub entry: String,
    pub language: String,
    pub files: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

impl From<&HookSpec> for Hook {
    fn from(spec: &HookSpec) -> Self {
        Self {
            id: spec.id.to_owned(),
            name: spec.id.to_owned(),
            entry: spec.entry.to_owned(),
            language: "system".to_owned(),
            files: spec.files.to_owned(),
            exclude: spec.exclude.map(str::to_owned),
        }
    }
}

/// Hook document for `presets`, or `None` when no preset is selected
#[must_use]
pub fn build_config(presets: &PresetSet) -> Option<PreCommitConfig> {
    if presets.is_empty() {
        return None;
    }

    let hooks = presets.iter().map(|preset| Hook::from(&preset.spec().hook)).collect();
    Some(PreCommitConfig {
        repos: vec![HookRepo {
            repo: "local".to_owned(),
            hooks,
        }],
    })
}

/// Render the config with the ownership marker on the first line
///
/// # Errors
///
/// Returns an error if YAML serialization fails
pub fn render_config(config: &PreCommitConfig) -> Result<String> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize pre-commit config")?;
    Ok(format!("{OWNERSHIP_MARKER}\n{yaml}"))
}

/// Reconcile `.pre-commit-config.yaml` and install the git hook
///
/// Foreign configs are only replaced with `force`. Whenever the config is
/// ours, `prek install` runs if `prek` is available. Returns the config path
/// when it was written.
///
/// # Errors
///
/// Returns an error if the config cannot be rendered, read or written
pub fn update_precommit_config(
    system: &dyn System,
    root: &Path,
    presets: &PresetSet,
    force: bool,
) -> Result<Option<PathBuf>> {
    let Some(config) = build_config(presets) else {
        return Ok(None);
    };
    let path = root.join(PRECOMMIT_CONFIG);
    if !may_overwrite(system, &path, force)? {
        return Ok(None);
    }

    let written = write_if_changed(system, &path, &render_config(&config)?)?;
    if written {
        info!("install: {}", path.display());
    }

    install_hook(system, root);
    Ok(written.then_some(path))
}

fn install_hook(system: &dyn System, root: &Path) {
    if !system.has_command("prek") {
        info!("skip: prek not installed (install via brew or cargo)");
        return;
    }

    match system.run_interactive("prek", &["install".to_owned()], root) {
        Ok(true) => {}
        Ok(false) => warn!("prek install failed"),
        Err(err) => warn!("failed to run prek install: {err}"),
    }
}

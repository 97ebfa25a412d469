//! Sync operation coordination

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use super::cleanup::remove_legacy_configs;
use super::install::install_configs;
use super::scan::list_repository_files;
use crate::config::{Selection, SyncConfig, resolve_config_source};
use crate::error::SyncError;
use crate::git::{CommitOutcome, Git, maybe_auto_commit};
use crate::patchers::{
    ensure_prettier_plugins, ensure_sqlfluff_exclude, update_justfile, update_precommit_config,
    update_prettier_plugins, update_sync_workflow,
};
use crate::presets::{
    Preset, PresetSet, derive_presets, detect_astro, detect_presets, resolve_file_set,
};
use crate::system::System;

/// Pseudo-choice selecting every preset
pub const CHOICE_ALL: &str = "all";
/// Pseudo-choice selecting nothing
pub const CHOICE_NONE: &str = "none";

/// Interactive preset selection
pub trait PresetPrompt {
    /// Let the user pick any subset of `choices`
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or is aborted
    fn select(&self, choices: &[&str]) -> Result<Vec<String>>;
}

/// What a sync run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct SyncReport {
    /// Presets derived from the installed file set
    pub presets: PresetSet,
    /// Config files copied into the target
    pub installed: Vec<PathBuf>,
    /// Legacy config files deleted
    pub removed: Vec<PathBuf>,
    /// Every path the run wrote or deleted
    pub managed: BTreeSet<PathBuf>,
    /// Auto-commit result, when `--commit` was given
    pub commit: Option<CommitOutcome>,
}

/// Coordinates one reconciliation of a target repository
#[non_exhaustive]
pub struct SyncOperation<'src> {
    config: SyncConfig,
    system: &'src dyn System,
    prompt: Option<&'src dyn PresetPrompt>,
}

impl<'src> SyncOperation<'src> {
    #[must_use]
    pub fn new(config: SyncConfig, system: &'src dyn System) -> Self {
        Self {
            config,
            system,
            prompt: None,
        }
    }

    /// Use `prompt` for interactive selection
    #[must_use]
    pub fn with_prompt(mut self, prompt: &'src dyn PresetPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Run the sync
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The target directory does not exist
    /// - The config source cannot be resolved
    /// - Interactive selection is requested without a prompt
    /// - A managed file cannot be written
    /// - Staging or committing fails
    pub fn execute(&self) -> Result<SyncReport> {
        let system = self.system;
        let config = &self.config;

        if !system.is_dir(&config.target_dir) {
            return Err(SyncError::target(format!(
                "target dir not found: {}",
                config.target_dir.display()
            ))
            .into());
        }
        let target = system.canonicalize(&config.target_dir).map_err(|err| {
            SyncError::target(format!(
                "cannot resolve {}: {err}",
                config.target_dir.display()
            ))
        })?;
        debug!("target: {}", target.display());

        let source = resolve_config_source(system, config)?;
        let git = Git::new(system, &target);

        let repo_files = list_repository_files(system, &git, &target, false)?;
        let pre_existing = if config.commit && git.is_work_tree() {
            git.status_paths()
        } else {
            BTreeSet::new()
        };
        let astro = detect_astro(system, &target, &repo_files);

        let tokens = self.select_tokens(&repo_files)?;
        if tokens.is_empty() {
            info!("no configs selected");
            return Ok(SyncReport::default());
        }
        debug!("tokens: {}", tokens.join(", "));

        let files = resolve_file_set(system, source.dir(), &tokens);
        if files.is_empty() {
            info!("no configs selected");
            return Ok(SyncReport::default());
        }
        let presets = derive_presets(&files);

        let removed = remove_legacy_configs(system, &git, &target, &presets, &files)?;
        let plugins = ensure_prettier_plugins(system, &target, &presets, astro);
        let installed = install_configs(system, source.dir(), &target, &files, config.force)?;

        let mut managed: BTreeSet<PathBuf> = BTreeSet::new();
        managed.extend(installed.iter().cloned());
        managed.extend(removed.iter().cloned());
        managed.extend(plugins.touched);
        managed.extend(update_prettier_plugins(
            system,
            &target,
            &presets,
            astro,
            plugins.plugins_available,
        )?);
        managed.extend(ensure_sqlfluff_exclude(system, &target, &presets)?);
        managed.extend(update_justfile(system, &target, &presets, config.just_mode)?);
        managed.extend(update_precommit_config(system, &target, &presets, config.force)?);
        managed.extend(update_sync_workflow(
            &git,
            &config.repo_url,
            &config.repo_ref,
            config.force,
        )?);

        let commit = if config.commit {
            Some(maybe_auto_commit(&git, &managed, &pre_existing)?)
        } else {
            None
        };

        info!(
            "synced {} ({} installed, {} removed, {} managed)",
            presets
                .iter()
                .map(|preset| preset.name())
                .collect::<Vec<_>>()
                .join(", "),
            installed.len(),
            removed.len(),
            managed.len()
        );

        Ok(SyncReport {
            presets,
            installed,
            removed,
            managed,
            commit,
        })
    }

    fn select_tokens(&self, repo_files: &[PathBuf]) -> Result<Vec<String>> {
        match &self.config.selection {
            Selection::Detect => Ok(detect_presets(repo_files)
                .into_iter()
                .map(|preset| preset.name().to_owned())
                .collect()),
            Selection::Only(tokens) => Ok(tokens.clone()),
            Selection::Interactive => {
                let prompt = self.prompt.ok_or_else(|| {
                    SyncError::configuration("interactive selection needs a terminal")
                })?;
                let mut choices: Vec<&str> = Preset::ALL.iter().map(|preset| preset.name()).collect();
                choices.extend([CHOICE_ALL, CHOICE_NONE]);
                Ok(expand_choices(prompt.select(&choices)?))
            }
        }
    }
}

/// Resolve the `all` and `none` pseudo-choices of an interactive selection
#[must_use]
pub fn expand_choices(selection: Vec<String>) -> Vec<String> {
    if selection.iter().any(|choice| choice == CHOICE_ALL) {
        Preset::ALL
            .iter()
            .map(|preset| preset.name().to_owned())
            .collect()
    } else if selection.iter().any(|choice| choice == CHOICE_NONE) {
        Vec::new()
    } else {
        selection
    }
}

//! Run configuration
//!
//! Command-line arguments are resolved into an immutable [`SyncConfig`]
//! before anything touches the target repository.

pub mod source;

pub use source::{ConfigSource, resolve_config_source};

use std::path::PathBuf;

use crate::patchers::JustMode;

/// Source repository used when no local config directory is found
pub const DEFAULT_REPO_URL: &str = "https://github.com/derKlinke/miedinger";

/// Git ref of the source repository
pub const DEFAULT_REF: &str = "main";

/// Environment variable overriding the source repository URL
pub const REPO_ENV: &str = "FORMAT_CONFIGS_REPO";

/// Environment variable overriding the source repository ref
pub const REF_ENV: &str = "FORMAT_CONFIGS_REF";

/// Environment variable pointing at a local config directory
pub const DIR_ENV: &str = "FORMAT_CONFIGS_DIR";

/// How the presets of a run are chosen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Detect presets from the repository contents
    #[default]
    Detect,
    /// Ask the user
    Interactive,
    /// Explicit preset names or filenames
    Only(Vec<String>),
}

/// Everything one sync run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SyncConfig {
    pub target_dir: PathBuf,
    pub selection: Selection,
    pub force: bool,
    pub just_mode: JustMode,
    pub commit: bool,
    pub repo_url: String,
    pub repo_ref: String,
    pub config_dir: Option<PathBuf>,
}

impl SyncConfig {
    /// Configuration for `target_dir` with every option at its default
    #[must_use]
    pub fn new(target_dir: PathBuf) -> Self {
        Self {
            target_dir,
            selection: Selection::default(),
            force: false,
            just_mode: JustMode::default(),
            commit: false,
            repo_url: DEFAULT_REPO_URL.to_owned(),
            repo_ref: DEFAULT_REF.to_owned(),
            config_dir: None,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_just_mode(mut self, just_mode: JustMode) -> Self {
        self.just_mode = just_mode;
        self
    }

    #[must_use]
    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    #[must_use]
    pub fn with_repo(mut self, url: String, git_ref: String) -> Self {
        self.repo_url = url;
        self.repo_ref = git_ref;
        self
    }

    #[must_use]
    pub fn with_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config_dir = dir;
        self
    }
}

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::config::{
    DEFAULT_REF, DEFAULT_REPO_URL, REF_ENV, REPO_ENV, Selection, SyncConfig,
};
use crate::patchers::JustMode;
use crate::presets::{FileSet, parse_token_list, registry};

/// Command-line arguments for format-configs
#[derive(Parser, Debug, Clone)]
#[command(name = "format-configs")]
#[command(about = "Sync shared formatter and linter configs into a repository")]
#[command(long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("mode").args(["detect", "interactive", "only", "list"])))]
pub struct Args {
    /// Repository to sync (defaults to the current directory)
    #[arg(value_name = "TARGET_DIR", default_value = ".")]
    pub target_dir: PathBuf,

    /// Auto-detect which configs to install (default)
    #[arg(long)]
    pub detect: bool,

    /// Select configs from a list
    #[arg(long)]
    pub interactive: bool,

    /// Comma/space-separated presets or filenames
    #[arg(long, value_name = "LIST")]
    pub only: Option<String>,

    /// Show available presets and files
    #[arg(long)]
    pub list: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,

    /// Create a Justfile if missing and add the format recipe
    #[arg(long, conflicts_with = "no_just")]
    pub just: bool,

    /// Skip Justfile integration
    #[arg(long = "no-just")]
    pub no_just: bool,

    /// Auto-commit managed changes when safe
    #[arg(long)]
    pub commit: bool,

    /// Source repository used when no local config directory is found
    #[arg(long, value_name = "URL", env = REPO_ENV, default_value = DEFAULT_REPO_URL)]
    pub repo: String,

    /// Git ref of the source repository
    #[arg(long = "ref", value_name = "REF", env = REF_ENV, default_value = DEFAULT_REF)]
    pub git_ref: String,

    /// Use configs from this directory instead of the bundled or remote ones
    #[arg(long, value_name = "PATH")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Selection mode implied by the flags
    #[must_use]
    pub fn selection(&self) -> Selection {
        if self.interactive {
            Selection::Interactive
        } else if let Some(list) = &self.only {
            Selection::Only(parse_token_list(list))
        } else {
            Selection::Detect
        }
    }

    /// Justfile mode implied by the flags
    #[must_use]
    pub const fn just_mode(&self) -> JustMode {
        if self.no_just {
            JustMode::Skip
        } else if self.just {
            JustMode::Force
        } else {
            JustMode::Auto
        }
    }

    /// Resolve the arguments into a run configuration
    #[must_use]
    pub fn to_config(&self) -> SyncConfig {
        SyncConfig::new(self.target_dir.clone())
            .with_selection(self.selection())
            .with_force(self.force)
            .with_just_mode(self.just_mode())
            .with_commit(self.commit)
            .with_repo(self.repo.clone(), self.git_ref.clone())
            .with_config_dir(self.config_dir.clone())
    }
}

/// Text printed by `--list`
#[must_use]
pub fn preset_listing() -> String {
    let mut out = String::from("Presets:\n");
    for spec in registry() {
        out.push_str(&format!(
            "  {:<9} -> {}\n",
            spec.preset.name(),
            spec.canonical.join(", ")
        ));
    }

    out.push_str("\nFiles:\n");
    let files: FileSet = registry()
        .iter()
        .flat_map(|spec| spec.canonical.iter().map(|file| (*file).to_owned()))
        .collect();
    for file in files {
        out.push_str(&format!("  {file}\n"));
    }
    out
}

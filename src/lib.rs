//! `format-configs` - Sync shared formatter and linter configs into repositories
//!
//! This library detects which toolchains a repository uses, installs the
//! matching canonical config files, removes legacy variants, keeps dependent
//! files (Prettier plugins, sqlfluff excludes, justfile recipes, pre-commit
//! hooks, the sync workflow) in line, and optionally commits the result.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod operations;
pub mod patchers;
pub mod presets;
pub mod system;

use anyhow::Result;
use cli::{Args, TerminalPrompt, preset_listing};
use operations::{SyncOperation, SyncReport};
use system::RealSystem;

/// Main entry point for the format-configs library
///
/// # Errors
///
/// Returns an error if the sync fails; see [`SyncOperation::execute`]
pub fn run(args: &Args) -> Result<Option<SyncReport>> {
    if args.list {
        // Listing goes to stdout, not through logging
        print!("{}", preset_listing());
        return Ok(None);
    }

    let system = RealSystem::new();
    let prompt = TerminalPrompt;
    let operation = SyncOperation::new(args.to_config(), &system).with_prompt(&prompt);
    operation.execute().map(Some)
}

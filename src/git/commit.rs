//! Auto-commit guard
//!
//! Decides whether the paths touched by a run can be committed without
//! disturbing the user's own work, and commits them when it is safe.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use super::repository::{COMMIT_MESSAGE, Git};

/// Why an auto-commit did or did not happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Target is not a git work tree
    NotARepository,
    /// The run touched no paths
    NothingManaged,
    /// HEAD is detached; committing would orphan the commit
    DetachedHead,
    /// These managed paths had uncommitted changes before the run
    PreExistingChanges(Vec<PathBuf>),
    /// The index already held staged changes before the run
    StagedChangesPresent,
    /// No managed path exists on disk or is tracked
    NothingToStage,
    /// Staging produced no diff against HEAD
    NothingStaged,
    /// The managed paths were committed
    Committed,
}

/// Commit `managed` if it is safe to do so
///
/// `pre_existing` is the `git status` snapshot taken before the run wrote
/// anything. The checks run in a fixed order and the first one that fails
/// ends the attempt.
///
/// # Errors
///
/// Returns an error if `git add` or `git commit` fails
pub fn maybe_auto_commit(
    git: &Git<'_>,
    managed: &BTreeSet<PathBuf>,
    pre_existing: &BTreeSet<PathBuf>,
) -> Result<CommitOutcome> {
    if !git.is_work_tree() {
        return Ok(CommitOutcome::NotARepository);
    }
    if managed.is_empty() {
        return Ok(CommitOutcome::NothingManaged);
    }
    if git.is_detached_head() {
        warn!("skip: detached HEAD (auto-commit disabled)");
        return Ok(CommitOutcome::DetachedHead);
    }

    let conflicts: Vec<PathBuf> = managed.intersection(pre_existing).cloned().collect();
    if !conflicts.is_empty() {
        warn!("skip: managed files already modified before install (auto-commit disabled)");
        return Ok(CommitOutcome::PreExistingChanges(conflicts));
    }

    if git.has_staged_changes() {
        warn!("skip: staged changes present (auto-commit disabled)");
        return Ok(CommitOutcome::StagedChangesPresent);
    }

    let system = git.system();
    let to_stage: Vec<PathBuf> = managed
        .iter()
        .filter(|path| system.exists(path) || git.is_tracked(path))
        .cloned()
        .collect();
    if to_stage.is_empty() {
        return Ok(CommitOutcome::NothingToStage);
    }

    git.add(&to_stage)?;

    if !git.has_staged_changes() {
        return Ok(CommitOutcome::NothingStaged);
    }

    git.commit(COMMIT_MESSAGE)?;
    info!("commit: {COMMIT_MESSAGE}");
    Ok(CommitOutcome::Committed)
}

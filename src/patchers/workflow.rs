//! GitHub Actions workflow that re-runs the sync on dispatch

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::{OWNERSHIP_MARKER, may_overwrite, write_if_changed};
use crate::git::Git;

/// Workflow location relative to the repository root
pub const WORKFLOW_PATH: &str = ".github/workflows/sync-format-configs.yml";

/// `owner/repo` part of a GitHub repository URL
///
/// Accepts https and scp-style ssh URLs, with or without a `.git` suffix.
#[must_use]
pub fn repository_slug(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let mut parts = trimmed
        .rsplit(['/', ':'])
        .filter(|part| !part.is_empty());
    let repo = parts.next()?;
    let owner = parts.next()?;
    let _host = parts.next()?;
    Some(format!("{owner}/{repo}"))
}

/// Workflow text using the sync action of `slug` at `git_ref`
#[must_use]
pub fn build_workflow(slug: &str, git_ref: &str) -> String {
    let action = format!("            - uses: {slug}/.github/actions/sync-format-configs@{git_ref}");
    [
        OWNERSHIP_MARKER,
        "name: Sync format configs",
        "on:",
        "    workflow_dispatch:",
        "    repository_dispatch:",
        "        types: [sync-format-configs]",
        "permissions:",
        "    contents: write",
        "jobs:",
        "    sync:",
        "        runs-on: ubuntu-latest",
        "        steps:",
        "            - uses: actions/checkout@v4",
        action.as_str(),
        "              with:",
        "                  mode: detect",
        "                  force: true",
        "                  commit: true",
        "                  push: true",
        "",
    ]
    .join("\n")
}

/// Reconcile the sync workflow in a git work tree
///
/// Returns the workflow path when it was written.
///
/// # Errors
///
/// Returns an error if an existing workflow cannot be read or the new one
/// cannot be written
pub fn update_sync_workflow(
    git: &Git<'_>,
    repo_url: &str,
    git_ref: &str,
    force: bool,
) -> Result<Option<PathBuf>> {
    if !git.is_work_tree() {
        debug!("not a git work tree; skipping sync workflow");
        return Ok(None);
    }
    let Some(slug) = repository_slug(repo_url) else {
        warn!("skip: cannot derive sync action from {repo_url}");
        return Ok(None);
    };

    let system = git.system();
    let path = git.root().join(Path::new(WORKFLOW_PATH));
    if !may_overwrite(system, &path, force)? {
        return Ok(None);
    }

    if !write_if_changed(system, &path, &build_workflow(&slug, git_ref))? {
        return Ok(None);
    }
    info!("install: {}", path.display());
    Ok(Some(path))
}

//! Thin client for the git command-line tool
//!
//! Every call runs `git -C <root> ...` through the `System` abstraction.
//! Read queries that are allowed to fail degrade to `false` or an empty list;
//! only the write operations (`add`, `commit`) surface errors.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::error::SyncError;
use crate::system::{CommandOutput, System};

/// Commit message used for automated commits
pub const COMMIT_MESSAGE: &str = "chore: sync format configs [skip ci]";

/// Git operations scoped to one working tree root
pub struct Git<'src> {
    system: &'src dyn System,
    root: PathBuf,
}

impl<'src> Git<'src> {
    /// Create a client for the repository rooted at `root`
    #[must_use]
    pub fn new(system: &'src dyn System, root: &Path) -> Self {
        Self {
            system,
            root: root.to_path_buf(),
        }
    }

    /// System the client runs commands through
    #[must_use]
    pub fn system(&self) -> &'src dyn System {
        self.system
    }

    /// Root directory this client operates on
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run(&self, args: &[&str]) -> std::io::Result<CommandOutput> {
        let mut full = vec!["-C".to_owned(), self.root.to_string_lossy().into_owned()];
        full.extend(args.iter().map(|arg| (*arg).to_owned()));
        debug!("git {}", full.join(" "));
        self.system.run_command("git", &full, &self.root)
    }

    /// Whether the command ran and exited successfully
    fn succeeds(&self, args: &[&str]) -> bool {
        self.run(args).is_ok_and(|output| output.success)
    }

    /// Whether the root lies inside a git work tree
    ///
    /// Any failure, including a missing `git` binary, counts as "no".
    #[must_use]
    pub fn is_work_tree(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"])
            .is_ok_and(|output| output.success && output.stdout.trim() == "true")
    }

    fn list(&self, args: &[&str]) -> Result<Vec<PathBuf>> {
        let output = self
            .run(args)
            .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
        if !output.success {
            return Err(SyncError::git(format!(
                "git {} failed: {}",
                args.join(" "),
                output.stderr.trim()
            ))
            .into());
        }

        Ok(output
            .stdout
            .split('\0')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| self.root.join(entry))
            .collect())
    }

    /// Tracked files, as absolute paths
    ///
    /// # Errors
    ///
    /// Returns an error if `git ls-files` cannot be run or fails
    pub fn tracked_files(&self) -> Result<Vec<PathBuf>> {
        self.list(&["ls-files", "-z"])
    }

    /// Untracked files that are not ignored, as absolute paths
    ///
    /// # Errors
    ///
    /// Returns an error if `git ls-files` cannot be run or fails
    pub fn untracked_files(&self) -> Result<Vec<PathBuf>> {
        self.list(&["ls-files", "-z", "--others", "--exclude-standard"])
    }

    /// Top-level directory of the work tree, if git can tell
    #[must_use]
    pub fn toplevel(&self) -> Option<PathBuf> {
        let output = self.run(&["rev-parse", "--show-toplevel"]).ok()?;
        let top = PathBuf::from(output.stdout.trim());
        (output.success && top.is_absolute()).then_some(top)
    }

    /// Paths reported by `git status`, as absolute paths
    ///
    /// Porcelain paths are relative to the top-level directory, which may
    /// sit above the root. Renamed entries contribute their new path. Returns
    /// an empty set when status cannot be read.
    #[must_use]
    pub fn status_paths(&self) -> BTreeSet<PathBuf> {
        let Ok(output) = self.run(&["status", "--porcelain", "-z", "--untracked-files=all"])
        else {
            return BTreeSet::new();
        };
        if !output.success {
            return BTreeSet::new();
        }

        let base = self.toplevel().unwrap_or_else(|| self.root.clone());
        parse_porcelain_z(&output.stdout)
            .into_iter()
            .map(|rel| base.join(rel))
            .collect()
    }

    /// Whether the index differs from HEAD
    ///
    /// A failing check is treated as "staged changes present".
    #[must_use]
    pub fn has_staged_changes(&self) -> bool {
        !self.succeeds(&["diff", "--cached", "--quiet"])
    }

    /// Whether HEAD is detached (not a symbolic ref to a branch)
    #[must_use]
    pub fn is_detached_head(&self) -> bool {
        !self.succeeds(&["symbolic-ref", "-q", "HEAD"])
    }

    /// Whether `path` is tracked by git
    #[must_use]
    pub fn is_tracked(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().into_owned();
        self.succeeds(&["ls-files", "--error-unmatch", "--", path.as_str()])
    }

    /// Stage the given paths, including deletions
    ///
    /// # Errors
    ///
    /// Returns an error if `git add` cannot be run or fails
    pub fn add(&self, paths: &[PathBuf]) -> Result<()> {
        let rendered: Vec<String> = paths
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        let mut args = vec!["add", "-A", "--"];
        args.extend(rendered.iter().map(String::as_str));

        let output = self.run(&args).context("Failed to run git add")?;
        if !output.success {
            return Err(SyncError::git(format!("git add failed: {}", output.stderr.trim())).into());
        }
        Ok(())
    }

    /// Commit the index with `message`
    ///
    /// # Errors
    ///
    /// Returns an error if `git commit` cannot be run or fails
    pub fn commit(&self, message: &str) -> Result<()> {
        let output = self
            .run(&["commit", "-m", message])
            .context("Failed to run git commit")?;
        if !output.success {
            return Err(
                SyncError::git(format!("git commit failed: {}", output.stderr.trim())).into(),
            );
        }
        Ok(())
    }
}

/// Parse `git status --porcelain -z` output into relative paths
///
/// Each record is `XY <path>`; rename and copy records are followed by an
/// extra record holding the original path, which is skipped.
#[must_use]
pub fn parse_porcelain_z(output: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut records = output.split('\0');

    while let Some(record) = records.next() {
        if record.len() < 4 {
            continue;
        }
        let (status, path) = record.split_at(3);
        if status.starts_with('R') || status.starts_with('C') {
            records.next();
        }
        if !path.is_empty() {
            paths.push(path.to_owned());
        }
    }

    paths
}

//! Repository file listing

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::{debug, warn};

use crate::git::Git;
use crate::system::System;

/// Directory names never descended into by the fallback walk
pub const SKIP_DIRS: &[&str] = &[".git", "node_modules", ".build", "DerivedData", "external"];

/// List the files of the repository rooted at `root`
///
/// Inside a git work tree the index is the source of truth, optionally
/// extended with untracked files that are not ignored. Outside of git, or if
/// the listing fails, the directory is walked instead.
///
/// # Errors
///
/// Returns an error if the fallback walk cannot read the directory
pub fn list_repository_files(
    system: &dyn System,
    git: &Git<'_>,
    root: &Path,
    include_untracked: bool,
) -> Result<Vec<PathBuf>> {
    if git.is_work_tree() {
        match git_files(git, include_untracked) {
            Ok(files) => {
                debug!("listed {} files from git", files.len());
                return Ok(files);
            }
            Err(err) => warn!("git listing failed, walking {} instead: {err}", root.display()),
        }
    }

    walk_files(system, root)
}

fn git_files(git: &Git<'_>, include_untracked: bool) -> Result<Vec<PathBuf>> {
    let mut files = git.tracked_files()?;
    if include_untracked {
        files.extend(git.untracked_files()?);
    }
    Ok(files)
}

/// Recursively list regular files below `root`, skipping [`SKIP_DIRS`]
///
/// # Errors
///
/// Returns an error if the directory cannot be walked
pub fn walk_files(system: &dyn System, root: &Path) -> Result<Vec<PathBuf>> {
    let entries = system
        .walk_dir(root, SKIP_DIRS)
        .with_context(|| format!("Failed to walk directory: {}", root.display()))?;

    Ok(entries
        .into_iter()
        .filter(|entry| entry.is_file)
        .map(|entry| entry.path)
        .collect())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::{CommandOutput, MockSystem};

    #[test]
    fn test_walk_skips_vendor_directories() {
        let system = MockSystem::new()
            .with_file("/r/src/app.swift", b"")
            .unwrap()
            .with_file("/r/node_modules/pkg/index.js", b"")
            .unwrap()
            .with_file("/r/.build/debug/main.swift", b"")
            .unwrap();
        let git = Git::new(&system, Path::new("/r"));

        let files = list_repository_files(&system, &git, Path::new("/r"), true).unwrap();
        assert_eq!(files, vec![PathBuf::from("/r/src/app.swift")]);
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let system = MockSystem::new().with_dir("/r").unwrap();
        let git = Git::new(&system, Path::new("/r"));

        assert!(list_repository_files(&system, &git, Path::new("/r"), false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_git_listing_with_untracked() {
        let system = MockSystem::new()
            .with_dir("/r")
            .unwrap()
            .with_command("git -C /r rev-parse", CommandOutput::ok("true\n"))
            .unwrap()
            .with_command("git -C /r ls-files -z", CommandOutput::ok("a.sql\0"))
            .unwrap()
            .with_command("git -C /r ls-files -z --others", CommandOutput::ok("b.md\0"))
            .unwrap();
        let git = Git::new(&system, Path::new("/r"));

        let tracked = list_repository_files(&system, &git, Path::new("/r"), false).unwrap();
        assert_eq!(tracked, vec![PathBuf::from("/r/a.sql")]);

        let all = list_repository_files(&system, &git, Path::new("/r"), true).unwrap();
        assert_eq!(all, vec![PathBuf::from("/r/a.sql"), PathBuf::from("/r/b.md")]);
    }

    #[test]
    fn test_failed_git_listing_falls_back_to_walk() {
        let system = MockSystem::new()
            .with_file("/r/README.md", b"")
            .unwrap()
            .with_command("git -C /r rev-parse", CommandOutput::ok("true\n"))
            .unwrap()
            .with_command("git -C /r ls-files", CommandOutput::failed(128))
            .unwrap();
        let git = Git::new(&system, Path::new("/r"));

        let files = list_repository_files(&system, &git, Path::new("/r"), false).unwrap();
        assert_eq!(files, vec![PathBuf::from("/r/README.md")]);
    }
}

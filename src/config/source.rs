//! Locating the directory that holds the canonical config files

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tempfile::TempDir;
use tracing::{debug, info};

use super::{DIR_ENV, SyncConfig};
use crate::error::SyncError;
use crate::system::System;

/// Name of the config directory inside a source checkout or install
pub const CONFIGS_DIR: &str = "configs";

/// A resolved config directory
///
/// When the directory comes from a temporary clone, the clone lives as long
/// as this value and is deleted when it drops.
#[derive(Debug)]
pub struct ConfigSource {
    dir: PathBuf,
    _checkout: Option<TempDir>,
}

impl ConfigSource {
    /// Source backed by an existing local directory
    #[must_use]
    pub fn local(dir: PathBuf) -> Self {
        Self {
            dir,
            _checkout: None,
        }
    }

    /// Directory holding the canonical config files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Config directories shipped with the binary, most specific first
fn bundled_candidates(system: &dyn System) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = system.current_exe()
        && let Some(bin_dir) = exe.parent()
    {
        candidates.push(bin_dir.join(CONFIGS_DIR));
        if let Some(prefix) = bin_dir.parent() {
            candidates.push(prefix.join("share").join("format-configs").join(CONFIGS_DIR));
        }
    }
    candidates.push(Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIGS_DIR));
    candidates
}

/// Find the config directory for this run
///
/// Tries, in order: the explicit `--config-dir`, a directory bundled with the
/// binary, `FORMAT_CONFIGS_DIR`, and finally a shallow clone of the source
/// repository.
///
/// # Errors
///
/// Returns a config source error if an explicit directory is missing or the
/// clone fails or lacks a `configs/` directory
pub fn resolve_config_source(system: &dyn System, config: &SyncConfig) -> Result<ConfigSource> {
    if let Some(dir) = &config.config_dir {
        if !system.is_dir(dir) {
            return Err(SyncError::config_source(format!(
                "config dir not found: {}",
                dir.display()
            ))
            .into());
        }
        debug!("using config dir {}", dir.display());
        return Ok(ConfigSource::local(dir.clone()));
    }

    if let Some(dir) = bundled_candidates(system)
        .into_iter()
        .find(|candidate| system.is_dir(candidate))
    {
        debug!("using bundled config dir {}", dir.display());
        return Ok(ConfigSource::local(dir));
    }

    if let Ok(dir) = system.env_var(DIR_ENV) {
        let dir = PathBuf::from(dir);
        if system.is_dir(&dir) {
            debug!("using {DIR_ENV}={}", dir.display());
            return Ok(ConfigSource::local(dir));
        }
    }

    clone_source(system, &config.repo_url, &config.repo_ref)
}

/// Shallow-clone `repo_url` at `git_ref` into a temporary directory
///
/// # Errors
///
/// Returns a config source error if the clone fails or has no `configs/`
pub fn clone_source(system: &dyn System, repo_url: &str, git_ref: &str) -> Result<ConfigSource> {
    let checkout = tempfile::Builder::new()
        .prefix("format-configs-")
        .tempdir()
        .context("Failed to create temporary directory for the config checkout")?;
    let path = checkout.path().to_path_buf();

    info!("fetch: {repo_url}@{git_ref}");
    let dest = path.to_string_lossy().into_owned();
    let args: Vec<String> = [
        "clone",
        "--depth",
        "1",
        "--branch",
        git_ref,
        repo_url,
        dest.as_str(),
    ]
    .iter()
    .map(|arg| (*arg).to_owned())
    .collect();

    let output = system
        .run_command("git", &args, &path)
        .map_err(|err| SyncError::config_source(format!("Failed to run git clone: {err}")))?;
    if !output.success {
        return Err(SyncError::config_source(format!(
            "Failed to clone '{repo_url}' at '{git_ref}': {}",
            output.stderr.trim()
        ))
        .into());
    }

    let dir = path.join(CONFIGS_DIR);
    if !system.is_dir(&dir) {
        return Err(
            SyncError::config_source(format!("config dir not found: {}", dir.display())).into(),
        );
    }

    Ok(ConfigSource {
        dir,
        _checkout: Some(checkout),
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    fn config() -> SyncConfig {
        SyncConfig::new(PathBuf::from("/r"))
    }

    #[test]
    fn test_explicit_dir_wins() {
        let system = MockSystem::new().with_dir("/custom/configs").unwrap();
        let source = resolve_config_source(
            &system,
            &config().with_config_dir(Some(PathBuf::from("/custom/configs"))),
        )
        .unwrap();
        assert_eq!(source.dir(), Path::new("/custom/configs"));
    }

    #[test]
    fn test_missing_explicit_dir_is_fatal() {
        let system = MockSystem::new();
        let err = resolve_config_source(
            &system,
            &config().with_config_dir(Some(PathBuf::from("/nowhere"))),
        )
        .unwrap_err();
        assert_eq!(err.downcast_ref::<SyncError>().map(SyncError::exit_code), Some(3));
    }

    #[test]
    fn test_bundled_next_to_executable() {
        let system = MockSystem::new()
            .with_current_exe("/opt/fc/bin/format-configs")
            .unwrap()
            .with_dir("/opt/fc/bin/configs")
            .unwrap();
        let source = resolve_config_source(&system, &config()).unwrap();
        assert_eq!(source.dir(), Path::new("/opt/fc/bin/configs"));
    }

    #[test]
    fn test_env_dir_used_when_nothing_bundled() {
        let system = MockSystem::new()
            .with_env(DIR_ENV, "/env/configs")
            .unwrap()
            .with_dir("/env/configs")
            .unwrap();
        let source = resolve_config_source(&system, &config()).unwrap();
        assert_eq!(source.dir(), Path::new("/env/configs"));
    }

    #[test]
    fn test_failed_clone_is_fatal() {
        let system = MockSystem::new()
            .with_command("git clone", crate::system::CommandOutput::failed(128))
            .unwrap();
        let err = clone_source(&system, "https://github.com/acme/configs", "v1").unwrap_err();

        assert!(system.ran("git clone --depth 1 --branch v1 https://github.com/acme/configs "));
        assert_eq!(err.downcast_ref::<SyncError>().map(SyncError::exit_code), Some(3));
    }
}

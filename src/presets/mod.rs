//! Presets: registry, detection and token expansion
//!
//! A preset names a bundle of config files for one toolchain. Tokens given on
//! the command line are either preset names or literal filenames; the file set
//! they expand to is the single input the downstream steps derive presets from.

pub mod detect;
pub mod registry;

pub use detect::*;
pub use registry::*;

use std::collections::BTreeSet;
use std::path::Path;

use tracing::warn;

use crate::system::System;

/// Canonical filenames selected for installation in one run
pub type FileSet = BTreeSet<String>;

/// Expand a token to the filenames it stands for
///
/// Known preset names expand to their canonical files; any other token is
/// taken literally as a single filename.
#[must_use]
pub fn expand_token(token: &str) -> Vec<String> {
    match token.parse::<Preset>() {
        Ok(preset) => preset
            .canonical_files()
            .iter()
            .map(|file| (*file).to_owned())
            .collect(),
        Err(_) => vec![token.to_owned()],
    }
}

/// Expand every token into one file set
#[must_use]
pub fn expand_tokens<S: AsRef<str>>(tokens: &[S]) -> FileSet {
    tokens
        .iter()
        .flat_map(|token| expand_token(token.as_ref()))
        .collect()
}

/// Presets implied by the canonical filenames present in `files`
#[must_use]
pub fn derive_presets(files: &FileSet) -> PresetSet {
    registry()
        .iter()
        .filter(|spec| spec.canonical.iter().any(|name| files.contains(*name)))
        .map(|spec| spec.preset)
        .collect()
}

/// Split a comma or space separated `--only` value into tokens
#[must_use]
pub fn parse_token_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Expand tokens and keep only files the source config directory provides
///
/// Files missing from the source are reported and dropped, so presets derived
/// from the result reflect what will actually be installed.
#[must_use]
pub fn resolve_file_set<S: AsRef<str>>(
    system: &dyn System,
    config_dir: &Path,
    tokens: &[S],
) -> FileSet {
    expand_tokens(tokens)
        .into_iter()
        .filter(|file| {
            let source = config_dir.join(file);
            let available = system.is_file(&source);
            if !available {
                warn!("skip: missing {}", source.display());
            }
            available
        })
        .collect()
}

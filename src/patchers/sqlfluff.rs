//! sqlfluff migrations exclude

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use regex::Regex;
use tracing::info;

use crate::error::SyncError;
use crate::presets::{Preset, PresetSet};
use crate::system::System;

pub const SQLFLUFF_CONFIG: &str = ".sqlfluff";

const SECTION: &str = "[sqlfluff]";
const EXCLUDE_LINE: &str = "exclude_paths = **/migrations/**";
const EXCLUDE_PATTERN: &str = r"(?im)^\s*exclude_paths\s*=.*migrations";
const EXCLUDE_KEY: &str = r"(?i)^\s*exclude_paths\s*=";
const MIGRATIONS_GLOB: &str = "**/migrations/**";

fn is_header(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('[') && line.ends_with(']')
}

/// Add the migrations exclude to sqlfluff config text
///
/// An existing `exclude_paths` in `[sqlfluff]` is extended rather than
/// repeated. Returns `None` when an exclude mentioning migrations is already
/// present.
///
/// # Errors
///
/// Returns an error if the detection pattern fails to compile
pub fn with_migrations_exclude(content: &str) -> Result<Option<String>> {
    let pattern = Regex::new(EXCLUDE_PATTERN)
        .with_context(|| format!("Invalid regex pattern: {EXCLUDE_PATTERN}"))?;
    if pattern.is_match(content) {
        return Ok(None);
    }

    let mut lines: Vec<String> = content.lines().map(str::to_owned).collect();
    let Some(start) = lines
        .iter()
        .position(|line| line.trim().eq_ignore_ascii_case(SECTION))
    else {
        let trimmed = content.trim_end();
        let separator = if trimmed.is_empty() { "" } else { "\n\n" };
        return Ok(Some(format!("{trimmed}{separator}{SECTION}\n{EXCLUDE_LINE}\n")));
    };

    let end = lines
        .iter()
        .skip(start + 1)
        .position(|line| is_header(line))
        .map_or(lines.len(), |offset| start + 1 + offset);
    let key = Regex::new(EXCLUDE_KEY)
        .with_context(|| format!("Invalid regex pattern: {EXCLUDE_KEY}"))?;
    if let Some(idx) = (start + 1..end).find(|&idx| key.is_match(&lines[idx])) {
        let extended = format!(
            "{},{MIGRATIONS_GLOB}",
            lines[idx].trim_end().trim_end_matches(',')
        );
        lines[idx] = extended;
    } else {
        let insert_at = (start + 1..end)
            .rev()
            .find(|&idx| !lines[idx].trim().is_empty())
            .map_or(start + 1, |idx| idx + 1);
        lines.insert(insert_at, EXCLUDE_LINE.to_owned());
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    Ok(Some(updated))
}

/// Make `.sqlfluff` exclude migrations when the sql preset is active
///
/// # Errors
///
/// Returns an error if the config cannot be read or written
pub fn ensure_sqlfluff_exclude(
    system: &dyn System,
    root: &Path,
    presets: &PresetSet,
) -> Result<Vec<PathBuf>> {
    if !presets.contains(&Preset::Sql) {
        return Ok(Vec::new());
    }
    let path = root.join(SQLFLUFF_CONFIG);
    if !system.is_file(&path) {
        return Ok(Vec::new());
    }

    let content = system
        .read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let Some(updated) = with_migrations_exclude(&content)? else {
        return Ok(Vec::new());
    };

    system
        .write(&path, updated.as_bytes())
        .map_err(|err| SyncError::filesystem(format!("Failed to write {}: {err}", path.display())))?;
    info!("update: {}", path.display());
    Ok(vec![path])
}

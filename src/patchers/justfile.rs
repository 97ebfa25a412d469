//! Justfile `format` recipe block
//!
//! The justfile is parsed into a typed line document, rewritten as a pure
//! function of that document and the selected presets, and serialized back.
//! After a rewrite the file holds exactly one managed block and no other
//! `format` recipe or `fmt`/`f` alias.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::presets::PresetSet;
use crate::system::System;

pub const BLOCK_START: &str = "# format-configs";
pub const BLOCK_END: &str = "# /format-configs";

/// Justfile names looked up in the target root, in priority order
pub const JUSTFILE_CANDIDATES: &[&str] = &["Justfile", "justfile", ".justfile"];

const RECIPE_INDENT: &str = "    ";

/// How the justfile integration behaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JustMode {
    /// Patch an existing justfile, never create one
    #[default]
    Auto,
    /// Create `Justfile` when none exists
    Force,
    /// Leave justfiles alone
    Skip,
}

/// One element of a parsed justfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JustLine {
    /// A line this tool does not own
    Foreign(String),
    /// A previously written managed block, markers included
    ManagedBlock(Vec<String>),
    /// A hand-written `format` recipe with its attributes and body
    LegacyTarget(Vec<String>),
    /// An `alias fmt := ...` or `alias f := ...` line
    LegacyAlias(String),
}

/// A justfile as a sequence of typed lines
pub type JustDocument = Vec<JustLine>;

struct Patterns {
    format_target: Regex,
    format_assignment: Regex,
    alias: Regex,
    attribute: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).with_context(|| format!("Invalid regex pattern: {pattern}"))
        };
        Ok(Self {
            format_target: compile(r"^@?format(\s[^:]*)?:([^=].*)?$")?,
            format_assignment: compile(r"^format\s*:=")?,
            alias: compile(r"^\s*alias\s+(fmt|f)\s*:=")?,
            attribute: compile(r"^\s*\[.*\]\s*$")?,
        })
    }
}

fn is_body_line(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

/// End of the recipe body starting at `start`
///
/// Blank lines belong to the body while an indented line follows them.
fn body_end(lines: &[&str], start: usize) -> usize {
    let mut end = start;
    let mut idx = start;
    while idx < lines.len() {
        if is_body_line(lines[idx]) {
            idx += 1;
            end = idx;
        } else if lines[idx].trim().is_empty() {
            idx += 1;
        } else {
            break;
        }
    }
    end
}

/// Parse justfile text into a typed document
///
/// # Errors
///
/// Returns an error if a line pattern fails to compile
pub fn parse(content: &str) -> Result<JustDocument> {
    let patterns = Patterns::new()?;
    let lines: Vec<&str> = content.lines().collect();
    let mut doc = JustDocument::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];

        if line.trim() == BLOCK_START
            && let Some(offset) = lines[idx + 1..]
                .iter()
                .position(|l| l.trim() == BLOCK_START || l.trim() == BLOCK_END)
            && lines[idx + 1 + offset].trim() == BLOCK_END
        {
            let end = idx + 1 + offset;
            doc.push(JustLine::ManagedBlock(
                lines[idx..=end].iter().map(|l| (*l).to_owned()).collect(),
            ));
            idx = end + 1;
            continue;
        }

        if patterns.alias.is_match(line) {
            doc.push(JustLine::LegacyAlias(line.to_owned()));
            idx += 1;
            continue;
        }

        if patterns.format_target.is_match(line) && !patterns.format_assignment.is_match(line) {
            let mut target = Vec::new();
            while let Some(JustLine::Foreign(prev)) = doc.last()
                && patterns.attribute.is_match(prev)
            {
                if let Some(JustLine::Foreign(attr)) = doc.pop() {
                    target.insert(0, attr);
                }
            }
            target.push(line.to_owned());
            let end = body_end(&lines, idx + 1);
            target.extend(lines[idx + 1..end].iter().map(|l| (*l).to_owned()));
            idx = end;
            doc.push(JustLine::LegacyTarget(target));
            continue;
        }

        doc.push(JustLine::Foreign(line.to_owned()));
        idx += 1;
    }

    Ok(doc)
}

/// Managed block lines for `presets`, or nothing when no preset is selected
#[must_use]
pub fn format_block(presets: &PresetSet) -> Vec<String> {
    if presets.is_empty() {
        return Vec::new();
    }

    let mut block = vec![
        BLOCK_START.to_owned(),
        "alias fmt := format".to_owned(),
        "alias f := format".to_owned(),
        "[group('formatting')]".to_owned(),
        "format:".to_owned(),
    ];
    for preset in presets {
        block.extend(
            preset
                .spec()
                .recipe
                .iter()
                .map(|line| format!("{RECIPE_INDENT}{line}")),
        );
    }
    block.push(BLOCK_END.to_owned());
    block
}

/// Drop everything this tool owns and append `block`
///
/// A blank line left doubled by a removal collapses into one, trailing
/// blank lines are trimmed and a single blank line separates the block from
/// the remaining content.
#[must_use]
pub fn rewrite(doc: &[JustLine], block: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut after_removal = false;

    for line in doc {
        let JustLine::Foreign(text) = line else {
            after_removal = true;
            continue;
        };
        let blank = text.trim().is_empty();
        if after_removal && blank && out.last().is_none_or(|last| last.trim().is_empty()) {
            continue;
        }
        after_removal = false;
        out.push(text.clone());
    }

    while out.last().is_some_and(|last| last.trim().is_empty()) {
        out.pop();
    }
    if !out.is_empty() {
        out.push(String::new());
    }
    out.extend(block.iter().cloned());
    out
}

/// Serialize lines with a trailing newline
#[must_use]
pub fn render(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Find the justfile in `root`
#[must_use]
pub fn find_justfile(system: &dyn System, root: &Path) -> Option<PathBuf> {
    JUSTFILE_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|path| system.is_file(path))
}

/// Reconcile the managed `format` block in the target's justfile
///
/// Returns the justfile path when it was written.
///
/// # Errors
///
/// Returns an error if the justfile cannot be read or written
pub fn update_justfile(
    system: &dyn System,
    root: &Path,
    presets: &PresetSet,
    mode: JustMode,
) -> Result<Option<PathBuf>> {
    if mode == JustMode::Skip {
        return Ok(None);
    }
    let block = format_block(presets);
    if block.is_empty() {
        return Ok(None);
    }

    let (path, content) = match find_justfile(system, root) {
        Some(path) => {
            let content = system
                .read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (path, content)
        }
        None if mode == JustMode::Force => (root.join(JUSTFILE_CANDIDATES[0]), String::new()),
        None => {
            debug!("no justfile in {}", root.display());
            return Ok(None);
        }
    };

    let updated = render(&rewrite(&parse(&content)?, &block));
    if updated == content {
        return Ok(None);
    }

    system
        .write(&path, updated.as_bytes())
        .map_err(|err| SyncError::filesystem(format!("Failed to write {}: {err}", path.display())))?;
    info!("update: {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::presets::Preset;
    use crate::system::MockSystem;

    const WEB_BLOCK: &str = "# format-configs
alias fmt := format
alias f := format
[group('formatting')]
format:
    npx --yes -p prettier -p prettier-plugin-tailwindcss -p prettier-plugin-astro prettier --write .
# /format-configs
";

    fn reconcile(content: &str, presets: &[Preset]) -> String {
        let presets: PresetSet = presets.iter().copied().collect();
        render(&rewrite(&parse(content).unwrap(), &format_block(&presets)))
    }

    #[test]
    fn test_parse_classifies_lines() {
        let doc = parse("[private]\nformat:\n    cargo fmt\nalias fmt := format\nbuild:\n    cargo build\n").unwrap();
        assert_eq!(
            doc,
            vec![
                JustLine::LegacyTarget(vec![
                    "[private]".to_owned(),
                    "format:".to_owned(),
                    "    cargo fmt".to_owned()
                ]),
                JustLine::LegacyAlias("alias fmt := format".to_owned()),
                JustLine::Foreign("build:".to_owned()),
                JustLine::Foreign("    cargo build".to_owned()),
            ]
        );
    }

    #[test]
    fn test_format_variable_is_foreign() {
        let doc = parse("format := \"json\"\nformatter:\n").unwrap();
        assert!(doc.iter().all(|line| matches!(line, JustLine::Foreign(_))));
    }

    #[test]
    fn test_parameterized_format_recipe_is_legacy() {
        let doc = parse("format target=\".\":\n    sqlfluff fix {{target}}\n").unwrap();
        assert_eq!(
            doc,
            vec![JustLine::LegacyTarget(vec![
                "format target=\".\":".to_owned(),
                "    sqlfluff fix {{target}}".to_owned()
            ])]
        );

        let updated = reconcile(
            "format target=\".\":\n    sqlfluff fix {{target}}\n",
            &[Preset::Sql],
        );
        assert!(!updated.contains("{{target}}"));
        assert_eq!(updated.lines().filter(|line| line.starts_with("format")).count(), 1);
    }

    #[test]
    fn test_quiet_and_variadic_format_recipes_are_legacy() {
        for recipe in ["@format:", "format *args:", "format: lint"] {
            let doc = parse(&format!("{recipe}\n    prettier --write .\n")).unwrap();
            assert!(
                matches!(doc.as_slice(), [JustLine::LegacyTarget(_)]),
                "{recipe} not recognised"
            );
        }
        let doc = parse("format:=\"json\"\n").unwrap();
        assert!(matches!(doc.as_slice(), [JustLine::Foreign(_)]));
    }

    #[test]
    fn test_legacy_body_spans_blank_lines() {
        let updated = reconcile(
            "format:\n    sqlfluff fix .\n\n    prettier --write .\n\nbuild:\n    make\n",
            &[Preset::Sql],
        );
        assert!(!updated.contains("prettier --write"));
        assert!(updated.starts_with("build:\n    make\n\n# format-configs\n"));
    }

    #[test]
    fn test_stray_start_marker_is_not_a_block() {
        let first = reconcile("# format-configs\nbuild:\n    make\n", &[Preset::Sql]);
        assert!(first.starts_with("# format-configs\nbuild:\n    make\n\n# format-configs\n"));

        let second = reconcile(&first, &[Preset::Sql]);
        assert_eq!(second, first);
        assert!(second.contains("build:\n    make\n"));
    }

    #[test]
    fn test_empty_justfile_gets_block_only() {
        assert_eq!(reconcile("", &[Preset::Web]), WEB_BLOCK);
    }

    #[test]
    fn test_legacy_target_replaced() {
        let updated = reconcile(
            "default:\n    just --list\n\nformat: lint\n    sqlfluff fix .\n\ntest:\n    cargo test\n",
            &[Preset::Sql],
        );
        assert_eq!(
            updated,
            "default:
    just --list

test:
    cargo test

# format-configs
alias fmt := format
alias f := format
[group('formatting')]
format:
    if command -v sqlfluff >/dev/null; then sqlfluff format .; fi
# /format-configs
"
        );
        assert_eq!(updated.matches("\nformat:").count(), 1);
    }

    #[test]
    fn test_existing_block_replaced_in_place_order() {
        let first = reconcile("build:\n    make\n", &[Preset::Swift, Preset::Sql]);
        let second = reconcile(&first, &[Preset::Sql]);
        assert_eq!(second, reconcile("build:\n    make\n", &[Preset::Sql]));
        assert_eq!(second.matches(BLOCK_START).count(), 1);
    }

    #[test]
    fn test_block_follows_canonical_order() {
        let block = format_block(&PresetSet::from([Preset::Sql, Preset::Markdown]));
        assert!(block[5].contains("markdownlint"));
        assert!(block[6].contains("sqlfluff"));
        assert_eq!(block.len(), 8);
    }

    #[test]
    fn test_modes() {
        let sql = PresetSet::from([Preset::Sql]);
        let root = Path::new("/r");

        let system = MockSystem::new().with_dir("/r").unwrap();
        assert!(update_justfile(&system, root, &sql, JustMode::Auto).unwrap().is_none());
        assert!(!system.exists(&root.join("Justfile")));

        assert_eq!(
            update_justfile(&system, root, &sql, JustMode::Force).unwrap(),
            Some(PathBuf::from("/r/Justfile"))
        );

        let hidden = MockSystem::new()
            .with_file("/r/.justfile", b"build:\n    make\n")
            .unwrap();
        assert!(update_justfile(&hidden, root, &sql, JustMode::Skip).unwrap().is_none());
        assert_eq!(
            update_justfile(&hidden, root, &sql, JustMode::Auto).unwrap(),
            Some(PathBuf::from("/r/.justfile"))
        );
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let system = MockSystem::new()
            .with_file("/r/justfile", b"format:\n    prettier --write .\n")
            .unwrap();
        let web = PresetSet::from([Preset::Web]);
        let root = Path::new("/r");

        assert!(update_justfile(&system, root, &web, JustMode::Auto).unwrap().is_some());
        assert_eq!(
            system.read_to_string(&root.join("justfile")).unwrap(),
            WEB_BLOCK
        );
        assert!(update_justfile(&system, root, &web, JustMode::Auto).unwrap().is_none());
    }
}

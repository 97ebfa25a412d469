//! Preset detection from repository contents

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::registry::{Preset, PresetSet};
use crate::system::System;

const WEB_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".css", ".scss", ".html", ".vue", ".svelte", ".astro",
];

const WEB_FILENAMES: &[&str] = &[
    "package.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lockb",
    "bun.lock",
    "deno.json",
    "deno.jsonc",
];

const CLANG_EXTENSIONS: &[&str] = &[
    ".c", ".h", ".cc", ".cpp", ".hpp", ".cxx", ".hxx", ".hh", ".m", ".mm",
];

const ASTRO_CONFIGS: &[&str] = &[
    "astro.config.mjs",
    "astro.config.cjs",
    "astro.config.js",
    "astro.config.ts",
];

/// Lowercased, forward-slash form of a path used for matching
fn normalized(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

fn matches_preset(preset: Preset, rel: &str) -> bool {
    let name = file_name(rel);
    match preset {
        Preset::Swift => {
            rel.ends_with(".swift")
                || name == "package.swift"
                || rel.contains(".xcodeproj/")
                || rel.contains(".xcworkspace/")
        }
        Preset::Web => {
            WEB_EXTENSIONS.iter().any(|ext| rel.ends_with(ext)) || WEB_FILENAMES.contains(&name)
        }
        Preset::Markdown => rel.ends_with(".md") || rel.ends_with(".mdx"),
        Preset::Clang => CLANG_EXTENSIONS.iter().any(|ext| rel.ends_with(ext)),
        Preset::Sql => rel.ends_with(".sql"),
    }
}

/// Map a file list to the presets it is evidence for
///
/// Output is in canonical order and contains each preset at most once,
/// independent of input order and of how many files match.
#[must_use]
pub fn detect_presets(files: &[PathBuf]) -> Vec<Preset> {
    let mut found = PresetSet::new();

    for file in files {
        let rel = normalized(file);
        for preset in Preset::ALL {
            if !found.contains(&preset) && matches_preset(preset, &rel) {
                found.insert(preset);
            }
        }
        if found.len() == Preset::ALL.len() {
            break;
        }
    }

    found.into_iter().collect()
}

/// Whether `package.json` at the root lists a dependency named `name`
pub(crate) fn manifest_has_dependency(system: &dyn System, root: &Path, name: &str) -> bool {
    let Ok(raw) = system.read_to_string(&root.join("package.json")) else {
        return false;
    };
    let Ok(manifest) = serde_json::from_str::<Value>(&raw) else {
        return false;
    };

    ["dependencies", "devDependencies"]
        .iter()
        .any(|section| manifest.get(section).and_then(|deps| deps.get(name)).is_some())
}

/// Whether the repository uses Astro
///
/// Requires a `package.json` at the root; then any of an `astro` dependency,
/// an `astro.config.*` file or an `.astro` source counts as evidence.
#[must_use]
pub fn detect_astro(system: &dyn System, root: &Path, files: &[PathBuf]) -> bool {
    if !system.exists(&root.join("package.json")) {
        return false;
    }

    let has_astro_files = files.iter().any(|file| {
        let rel = normalized(file);
        rel.ends_with(".astro") || ASTRO_CONFIGS.contains(&file_name(&rel))
    });

    has_astro_files || manifest_has_dependency(system, root, "astro")
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_detect_each_preset() {
        assert_eq!(detect_presets(&paths(&["/r/Package.swift"])), vec![Preset::Swift]);
        assert_eq!(
            detect_presets(&paths(&["/r/App.xcodeproj/project.pbxproj"])),
            vec![Preset::Swift]
        );
        assert_eq!(detect_presets(&paths(&["/r/yarn.lock"])), vec![Preset::Web]);
        assert_eq!(detect_presets(&paths(&["/r/docs/a.mdx"])), vec![Preset::Markdown]);
        assert_eq!(detect_presets(&paths(&["/r/src/main.mm"])), vec![Preset::Clang]);
        assert_eq!(detect_presets(&paths(&["/r/db/init.SQL"])), vec![Preset::Sql]);
    }

    #[test]
    fn test_detect_is_ordered_and_deduplicated() {
        let files = paths(&[
            "/r/schema.sql",
            "/r/README.md",
            "/r/src/lib.c",
            "/r/web/app.tsx",
            "/r/Sources/App.swift",
            "/r/CHANGELOG.md",
            "/r/Sources/Other.swift",
        ]);

        assert_eq!(
            detect_presets(&files),
            vec![
                Preset::Swift,
                Preset::Web,
                Preset::Markdown,
                Preset::Clang,
                Preset::Sql
            ]
        );
    }

    #[test]
    fn test_detect_ignores_unrelated_files() {
        let files = paths(&["/r/Cargo.toml", "/r/src/main.rs", "/r/package.json.bak"]);
        assert!(detect_presets(&files).is_empty());
        assert!(detect_presets(&[]).is_empty());
    }

    #[test]
    fn test_detect_astro_requires_manifest() {
        let files = paths(&["/r/src/pages/index.astro"]);
        let without = MockSystem::new().with_dir("/r").unwrap();
        assert!(!detect_astro(&without, Path::new("/r"), &files));

        let with = MockSystem::new()
            .with_file("/r/package.json", b"{}")
            .unwrap();
        assert!(detect_astro(&with, Path::new("/r"), &files));
    }

    #[test]
    fn test_detect_astro_from_dependency() {
        let system = MockSystem::new()
            .with_file(
                "/r/package.json",
                br#"{"devDependencies": {"astro": "^4.0.0"}}"#,
            )
            .unwrap();
        assert!(detect_astro(&system, Path::new("/r"), &[]));

        let plain = MockSystem::new()
            .with_file("/r/package.json", br#"{"dependencies": {"react": "18"}}"#)
            .unwrap();
        assert!(!detect_astro(&plain, Path::new("/r"), &paths(&["/r/src/app.tsx"])));
    }
}

//! The preset registry
//!
//! Single source of truth for everything a preset owns: the files it
//! installs, the legacy names it cleans up, the recipe lines it contributes
//! to the justfile block and the pre-commit hook it generates.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use crate::error::SyncError;

/// A named bundle of configuration files for one toolchain
///
/// Variant order is the canonical output order used everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Preset {
    Swift,
    Web,
    Markdown,
    Clang,
    Sql,
}

/// Ordered set of presets
pub type PresetSet = BTreeSet<Preset>;

/// A local pre-commit hook contributed by a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookSpec {
    pub id: &'static str,
    pub entry: &'static str,
    pub files: &'static str,
    pub exclude: Option<&'static str>,
}

/// Everything the tool knows about one preset
#[derive(Debug, Clone, Copy)]
pub struct PresetSpec {
    pub preset: Preset,
    pub canonical: &'static [&'static str],
    pub legacy: &'static [&'static str],
    pub recipe: &'static [&'static str],
    pub hook: HookSpec,
}

const CLANG_RECIPE: &str = "if command -v clang-format >/dev/null; then \
if git rev-parse --is-inside-work-tree >/dev/null 2>&1; then \
git ls-files -z '*.c' '*.cc' '*.cpp' '*.cxx' '*.h' '*.hh' '*.hpp' '*.hxx' '*.m' '*.mm' | xargs -0 clang-format -i; \
else find . -type f \\( -name '*.c' -o -name '*.cc' -o -name '*.cpp' -o -name '*.cxx' -o -name '*.h' \
-o -name '*.hh' -o -name '*.hpp' -o -name '*.hxx' -o -name '*.m' -o -name '*.mm' \\) -print0 | xargs -0 clang-format -i; \
fi; fi";

static REGISTRY: [PresetSpec; 5] = [
    PresetSpec {
        preset: Preset::Swift,
        canonical: &[".swiftformat", ".swiftlint.yml"],
        legacy: &[".swiftformat", ".swiftlint.yml", ".swiftlint.yaml"],
        recipe: &[
            "if command -v swiftformat >/dev/null; then swiftformat .; fi",
            "if command -v swiftlint >/dev/null; then swiftlint --config .swiftlint.yml --force-exclude --reporter github-actions-logging; fi",
        ],
        hook: HookSpec {
            id: "swiftformat",
            entry: "swiftformat",
            files: r"\.(swift)$",
            exclude: None,
        },
    },
    PresetSpec {
        preset: Preset::Web,
        canonical: &[".prettierrc.json"],
        legacy: &[
            ".prettierrc",
            ".prettierrc.json",
            ".prettierrc.yml",
            ".prettierrc.yaml",
            ".prettierrc.toml",
            ".prettierrc.js",
            ".prettierrc.cjs",
            ".prettierrc.mjs",
            "prettier.config.js",
            "prettier.config.cjs",
            "prettier.config.mjs",
            "prettier.config.ts",
        ],
        recipe: &[
            "npx --yes -p prettier -p prettier-plugin-tailwindcss -p prettier-plugin-astro prettier --write .",
        ],
        hook: HookSpec {
            id: "prettier",
            entry: "npx --yes prettier --config .prettierrc.json --write",
            files: r"\.(js|jsx|ts|tsx|json|jsonc|yaml|yml|css|scss|html|vue|svelte|astro)$",
            exclude: Some(r"^\.pre-commit-config\.ya?ml$"),
        },
    },
    PresetSpec {
        preset: Preset::Markdown,
        canonical: &[".markdownlint.json"],
        legacy: &[
            ".markdownlint",
            ".markdownlint.json",
            ".markdownlint.jsonc",
            ".markdownlint.yml",
            ".markdownlint.yaml",
            ".markdownlint.js",
            ".markdownlint.cjs",
            ".markdownlint.mjs",
            "markdownlint.config.js",
            "markdownlint.config.cjs",
            "markdownlint.config.mjs",
            "markdownlint-cli2.json",
            "markdownlint-cli2.jsonc",
            "markdownlint-cli2.yml",
            "markdownlint-cli2.yaml",
            "markdownlint-cli2.js",
            "markdownlint-cli2.cjs",
            "markdownlint-cli2.mjs",
        ],
        recipe: &[
            "npx --yes -p markdownlint-cli markdownlint --config .markdownlint.json \"**/*.md\"",
        ],
        hook: HookSpec {
            id: "markdownlint",
            entry: "npx --yes -p markdownlint-cli markdownlint --config .markdownlint.json",
            files: r"\.(md|mdx)$",
            exclude: None,
        },
    },
    PresetSpec {
        preset: Preset::Clang,
        canonical: &[".clang-format"],
        legacy: &[".clang-format", "_clang-format"],
        recipe: &[CLANG_RECIPE],
        hook: HookSpec {
            id: "clang-format",
            entry: "clang-format -i",
            files: r"\.(c|cc|cpp|cxx|h|hh|hpp|hxx|m|mm)$",
            exclude: None,
        },
    },
    PresetSpec {
        preset: Preset::Sql,
        canonical: &[".sqlfluff"],
        legacy: &[".sqlfluff"],
        recipe: &["if command -v sqlfluff >/dev/null; then sqlfluff format .; fi"],
        hook: HookSpec {
            id: "sqlfluff",
            entry: "sqlfluff format",
            files: r"\.(sql)$",
            exclude: Some("(^|/)migrations/"),
        },
    },
];

impl Preset {
    /// All presets in canonical order
    pub const ALL: [Self; 5] = [Self::Swift, Self::Web, Self::Markdown, Self::Clang, Self::Sql];

    /// Name used on the command line
    #[must_use]
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::Web => "web",
            Self::Markdown => "markdown",
            Self::Clang => "clang",
            Self::Sql => "sql",
        }
    }

    /// Registry entry for this preset
    #[must_use]
    #[inline]
    pub fn spec(self) -> &'static PresetSpec {
        let index = match self {
            Self::Swift => 0,
            Self::Web => 1,
            Self::Markdown => 2,
            Self::Clang => 3,
            Self::Sql => 4,
        };
        &REGISTRY[index]
    }

    /// Canonical filenames installed by this preset
    #[must_use]
    #[inline]
    pub fn canonical_files(self) -> &'static [&'static str] {
        self.spec().canonical
    }

    /// Legacy or alias filenames removed when this preset is active
    #[must_use]
    #[inline]
    pub fn legacy_files(self) -> &'static [&'static str] {
        self.spec().legacy
    }
}

impl fmt::Display for Preset {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = SyncError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| SyncError::configuration(format!("Unknown preset: '{s}'")))
    }
}

/// The full registry in canonical order
#[must_use]
#[inline]
pub fn registry() -> &'static [PresetSpec] {
    &REGISTRY
}

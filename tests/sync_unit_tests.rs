//! Unit tests for the sync operation against the mock system

#![expect(clippy::unwrap_used, reason = "This is a test module")]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use format_configs::config::{Selection, SyncConfig};
use format_configs::error::SyncError;
use format_configs::git::CommitOutcome;
use format_configs::operations::{PresetPrompt, SyncOperation, SyncReport};
use format_configs::patchers::JustMode;
use format_configs::presets::{Preset, PresetSet};
use format_configs::system::{CommandOutput, MockSystem, System};

const SQLFLUFF: &[u8] = b"[sqlfluff]\ndialect = ansi\nexclude_paths = **/migrations/**\n";

/// Mock system with a full config source directory at /configs
fn with_configs() -> MockSystem {
    MockSystem::new()
        .with_file("/configs/.swiftformat", b"--indent 4\n")
        .unwrap()
        .with_file("/configs/.swiftlint.yml", b"line_length: 120\n")
        .unwrap()
        .with_file("/configs/.prettierrc.json", b"{\n    \"tabWidth\": 4\n}\n")
        .unwrap()
        .with_file("/configs/.markdownlint.json", b"{\"default\": true}\n")
        .unwrap()
        .with_file("/configs/.clang-format", b"BasedOnStyle: LLVM\n")
        .unwrap()
        .with_file("/configs/.sqlfluff", SQLFLUFF)
        .unwrap()
}

/// Mock git work tree at /r with a clean status
fn git_repo(system: MockSystem, tracked: &str) -> MockSystem {
    system
        .with_command("git -C /r rev-parse --is-inside-work-tree", CommandOutput::ok("true\n"))
        .unwrap()
        .with_command("git -C /r rev-parse --show-toplevel", CommandOutput::ok("/r\n"))
        .unwrap()
        .with_command("git -C /r ls-files -z", CommandOutput::ok(tracked))
        .unwrap()
        .with_command("git -C /r ls-files -z --others", CommandOutput::ok(""))
        .unwrap()
        .with_command("git -C /r ls-files --error-unmatch", CommandOutput::ok(""))
        .unwrap()
        .with_command("git -C /r status", CommandOutput::ok(""))
        .unwrap()
        .with_command("git -C /r symbolic-ref", CommandOutput::ok("refs/heads/main\n"))
        .unwrap()
        .with_command("git -C /r add", CommandOutput::ok(""))
        .unwrap()
        .with_command("git -C /r commit", CommandOutput::ok(""))
        .unwrap()
}

fn config() -> SyncConfig {
    SyncConfig::new(PathBuf::from("/r")).with_config_dir(Some(PathBuf::from("/configs")))
}

fn only(tokens: &[&str]) -> Selection {
    Selection::Only(tokens.iter().map(|token| (*token).to_owned()).collect())
}

fn run(system: &MockSystem, config: SyncConfig) -> SyncReport {
    SyncOperation::new(config, system).execute().unwrap()
}

fn read(system: &MockSystem, path: &str) -> String {
    system.read_to_string(Path::new(path)).unwrap()
}

#[test]
fn test_detect_installs_and_skips_existing() {
    let system = with_configs()
        .with_file("/r/src/app.swift", b"print(1)\n")
        .unwrap()
        .with_file("/r/README.md", b"# app\n")
        .unwrap()
        .with_file("/r/.swiftformat", b"--indent 2\n")
        .unwrap();

    let report = run(&system, config());

    assert_eq!(report.presets, PresetSet::from([Preset::Swift, Preset::Markdown]));
    assert_eq!(
        report.installed,
        vec![
            PathBuf::from("/r/.markdownlint.json"),
            PathBuf::from("/r/.swiftlint.yml")
        ]
    );
    assert_eq!(read(&system, "/r/.swiftformat"), "--indent 2\n");
    assert!(report.removed.is_empty());
    assert!(report.managed.contains(Path::new("/r/.pre-commit-config.yaml")));
    assert!(!system.exists(Path::new("/r/.github")));
    assert_eq!(report.commit, None);
}

#[test]
fn test_force_overwrites_existing() {
    let system = with_configs()
        .with_file("/r/Sources/App.swift", b"")
        .unwrap()
        .with_file("/r/.swiftformat", b"--indent 2\n")
        .unwrap();

    let report = run(&system, config().with_force(true));

    assert!(report.installed.contains(&PathBuf::from("/r/.swiftformat")));
    assert_eq!(read(&system, "/r/.swiftformat"), "--indent 4\n");
}

#[test]
fn test_empty_justfile_gets_exact_block() {
    let system = with_configs()
        .with_file("/r/Justfile", b"")
        .unwrap();

    run(&system, config().with_selection(only(&["web"])));

    assert_eq!(
        read(&system, "/r/Justfile"),
        "# format-configs
alias fmt := format
alias f := format
[group('formatting')]
format:
    npx --yes -p prettier -p prettier-plugin-tailwindcss -p prettier-plugin-astro prettier --write .
# /format-configs
"
    );
}

#[test]
fn test_legacy_format_recipe_is_replaced() {
    let system = with_configs()
        .with_file("/r/db/schema.sql", b"select 1;\n")
        .unwrap()
        .with_file(
            "/r/justfile",
            b"alias f := format\n\n[group('lint')]\nformat:\n    sqlfluff fix .\n\nbuild:\n    make\n",
        )
        .unwrap();

    let report = run(&system, config());

    let justfile = read(&system, "/r/justfile");
    assert_eq!(report.presets, PresetSet::from([Preset::Sql]));
    assert_eq!(justfile.matches("\nformat:").count(), 1);
    assert_eq!(justfile.matches("alias f :=").count(), 1);
    assert!(!justfile.contains("sqlfluff fix"));
    assert!(!justfile.contains("[group('lint')]"));
    assert!(justfile.starts_with("build:\n    make\n\n# format-configs\n"));
    assert!(justfile.contains("    if command -v sqlfluff >/dev/null; then sqlfluff format .; fi\n"));
}

#[test]
fn test_astro_plugin_swapped_for_tailwind() {
    let system = with_configs()
        .with_file("/r/src/app.ts", b"")
        .unwrap()
        .with_file(
            "/r/package.json",
            br#"{"devDependencies": {"prettier-plugin-tailwindcss": "^0.6.0"}}"#,
        )
        .unwrap()
        .with_file("/r/.prettierrc.json", br#"{"plugins": ["prettier-plugin-astro"]}"#)
        .unwrap();

    let report = run(&system, config());

    assert_eq!(
        read(&system, "/r/.prettierrc.json"),
        "{\n    \"plugins\": [\"prettier-plugin-tailwindcss\"]\n}\n"
    );
    assert!(report.managed.contains(Path::new("/r/.prettierrc.json")));
    assert!(system.commands().iter().all(|line| !line.starts_with("bun")));
}

#[test]
fn test_missing_plugins_installed_with_package_manager() {
    let system = with_configs()
        .with_file("/r/src/pages/index.astro", b"")
        .unwrap()
        .with_file("/r/package.json", br#"{"packageManager": "npm@10.2.0"}"#)
        .unwrap()
        .with_file("/r/package-lock.json", b"{}")
        .unwrap()
        .with_command("npm install -D", CommandOutput::ok(""))
        .unwrap();

    let report = run(&system, config());

    assert!(system.ran("npm install -D prettier-plugin-tailwindcss prettier-plugin-astro"));
    assert!(report.managed.contains(Path::new("/r/package.json")));
    assert!(report.managed.contains(Path::new("/r/package-lock.json")));
    assert_eq!(
        read(&system, "/r/.prettierrc.json"),
        "{\n    \"tabWidth\": 4,\n    \"plugins\": [\"prettier-plugin-tailwindcss\", \"prettier-plugin-astro\"]\n}\n"
    );
}

#[test]
fn test_cleanup_keeps_root_canonical_file() {
    let system = with_configs()
        .with_file("/r/README.md", b"")
        .unwrap()
        .with_file("/r/.markdownlint.json", b"{\"MD013\": false}\n")
        .unwrap()
        .with_file("/r/.markdownlint.yaml", b"MD013: false\n")
        .unwrap()
        .with_file("/r/docs/.markdownlint.json", b"{}\n")
        .unwrap()
        .with_file("/r/.markdownlintignore", b"CHANGELOG.md\n")
        .unwrap();

    let report = run(&system, config());

    assert_eq!(
        report.removed,
        vec![
            PathBuf::from("/r/.markdownlint.yaml"),
            PathBuf::from("/r/docs/.markdownlint.json")
        ]
    );
    assert_eq!(read(&system, "/r/.markdownlint.json"), "{\"MD013\": false}\n");
    assert!(system.exists(Path::new("/r/.markdownlintignore")));
}

#[test]
fn test_second_run_changes_nothing() {
    let system = with_configs()
        .with_file("/r/app.swift", b"")
        .unwrap()
        .with_file("/r/web/index.html", b"")
        .unwrap()
        .with_file("/r/schema.sql", b"")
        .unwrap()
        .with_file("/r/lib/main.c", b"")
        .unwrap();
    let config = config().with_just_mode(JustMode::Force);

    let first = run(&system, config.clone());
    assert_eq!(first.presets.len(), 4);
    assert!(first.managed.contains(Path::new("/r/Justfile")));

    let second = run(&system, config);
    assert_eq!(second.presets, first.presets);
    assert!(second.installed.is_empty());
    assert!(second.removed.is_empty());
    assert!(second.managed.is_empty());
}

#[test]
fn test_no_selection_is_a_no_op() {
    let system = with_configs()
        .with_file("/r/Cargo.toml", b"")
        .unwrap();

    let report = run(&system, config());
    assert_eq!(report, SyncReport::default());
    assert!(!system.exists(Path::new("/r/.pre-commit-config.yaml")));

    let missing = run(&system, config().with_selection(only(&[".editorconfig"])));
    assert_eq!(missing, SyncReport::default());
}

#[test]
fn test_literal_filename_token() {
    let system = with_configs()
        .with_file("/configs/.editorconfig", b"root = true\n")
        .unwrap()
        .with_dir("/r")
        .unwrap();

    let report = run(&system, config().with_selection(only(&[".editorconfig", "clang"])));

    assert_eq!(report.presets, PresetSet::from([Preset::Clang]));
    assert_eq!(read(&system, "/r/.editorconfig"), "root = true\n");
}

#[test]
fn test_missing_target_is_a_target_error() {
    let system = with_configs();
    let err = SyncOperation::new(SyncConfig::new(PathBuf::from("/absent")), &system)
        .execute()
        .unwrap_err();

    assert_eq!(err.downcast_ref::<SyncError>().map(SyncError::exit_code), Some(2));
}

#[test]
fn test_pre_existing_change_blocks_commit() {
    let system = git_repo(
        with_configs()
            .with_file("/r/schema.sql", b"")
            .unwrap()
            .with_file("/r/Justfile", b"build:\n    make\n")
            .unwrap(),
        "schema.sql\0Justfile\0",
    )
    .with_command("git -C /r status", CommandOutput::ok(" M Justfile\0"))
    .unwrap();

    let report = run(&system, config().with_commit(true));

    assert_eq!(
        report.commit,
        Some(CommitOutcome::PreExistingChanges(vec![PathBuf::from("/r/Justfile")]))
    );
    assert!(!system.ran("git -C /r add"));
    assert!(!system.ran("git -C /r commit"));
    assert!(report.managed.contains(Path::new("/r/.github/workflows/sync-format-configs.yml")));
}

#[test]
fn test_safe_commit_stages_managed_paths() {
    let system = git_repo(
        with_configs()
            .with_file("/r/schema.sql", b"")
            .unwrap(),
        "schema.sql\0",
    )
    .with_command_sequence(
        "git -C /r diff --cached",
        vec![CommandOutput::ok(""), CommandOutput::failed(1)],
    )
    .unwrap();

    let report = run(&system, config().with_commit(true));

    assert_eq!(report.commit, Some(CommitOutcome::Committed));
    let managed: BTreeSet<PathBuf> = [
        "/r/.github/workflows/sync-format-configs.yml",
        "/r/.pre-commit-config.yaml",
        "/r/.sqlfluff",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(report.managed, managed);
    assert!(system.ran(
        "git -C /r add -A -- /r/.github/workflows/sync-format-configs.yml /r/.pre-commit-config.yaml /r/.sqlfluff"
    ));
    assert!(system.ran("git -C /r commit -m chore: sync format configs [skip ci]"));
}

#[test]
fn test_detached_head_skips_commit() {
    let system = git_repo(
        with_configs()
            .with_file("/r/schema.sql", b"")
            .unwrap(),
        "schema.sql\0",
    )
    .with_command("git -C /r symbolic-ref", CommandOutput::failed(1))
    .unwrap();

    let report = run(&system, config().with_commit(true));

    assert_eq!(report.commit, Some(CommitOutcome::DetachedHead));
    assert!(!system.ran("git -C /r add"));
}

struct FixedPrompt(Vec<&'static str>);

impl PresetPrompt for FixedPrompt {
    fn select(&self, choices: &[&str]) -> Result<Vec<String>> {
        assert_eq!(choices, ["swift", "web", "markdown", "clang", "sql", "all", "none"]);
        Ok(self.0.iter().map(|choice| (*choice).to_owned()).collect())
    }
}

#[test]
fn test_interactive_all_selects_every_preset() {
    let system = with_configs().with_dir("/r").unwrap();
    let prompt = FixedPrompt(vec!["sql", "all"]);

    let report = SyncOperation::new(config().with_selection(Selection::Interactive), &system)
        .with_prompt(&prompt)
        .execute()
        .unwrap();

    assert_eq!(report.presets, PresetSet::from(Preset::ALL));
}

#[test]
fn test_interactive_none_and_missing_prompt() {
    let system = with_configs().with_dir("/r").unwrap();
    let prompt = FixedPrompt(vec!["web", "none"]);

    let report = SyncOperation::new(config().with_selection(Selection::Interactive), &system)
        .with_prompt(&prompt)
        .execute()
        .unwrap();
    assert_eq!(report, SyncReport::default());

    let err = SyncOperation::new(config().with_selection(Selection::Interactive), &system)
        .execute()
        .unwrap_err();
    assert_eq!(err.downcast_ref::<SyncError>().map(SyncError::exit_code), Some(1));
}

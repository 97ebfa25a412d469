//! Prettier plugin dev-dependencies

use core::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::presets::{Preset, PresetSet};
use crate::system::System;

pub const TAILWIND_PLUGIN: &str = "prettier-plugin-tailwindcss";
pub const ASTRO_PLUGIN: &str = "prettier-plugin-astro";

const LOCKFILES: &[&str] = &[
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lockb",
    "bun.lock",
];

/// JavaScript package manager used to add dev-dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Bun,
    Pnpm,
    Yarn,
    Npm,
}

impl PackageManager {
    /// Executable name
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Bun => "bun",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Npm => "npm",
        }
    }

    /// Arguments that add `packages` as dev-dependencies
    #[must_use]
    pub fn add_dev_args(self, packages: &[&str]) -> Vec<String> {
        let prefix: &[&str] = match self {
            Self::Bun => &["add", "-d"],
            Self::Pnpm | Self::Yarn => &["add", "-D"],
            Self::Npm => &["install", "-D"],
        };
        prefix
            .iter()
            .chain(packages)
            .map(|arg| (*arg).to_owned())
            .collect()
    }

    fn from_field(value: &str) -> Option<Self> {
        match value.split('@').next().unwrap_or_default() {
            "bun" => Some(Self::Bun),
            "pnpm" => Some(Self::Pnpm),
            "yarn" => Some(Self::Yarn),
            "npm" => Some(Self::Npm),
            _ => None,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Pick the package manager for the project at `root`
///
/// The manifest's `packageManager` field wins, then lockfiles are checked
/// (pnpm, yarn, bun, npm). Defaults to bun.
#[must_use]
pub fn detect_package_manager(system: &dyn System, root: &Path, manifest: &Value) -> PackageManager {
    if let Some(manager) = manifest
        .get("packageManager")
        .and_then(Value::as_str)
        .and_then(PackageManager::from_field)
    {
        return manager;
    }

    let has = |name: &str| system.exists(&root.join(name));
    if has("pnpm-lock.yaml") {
        PackageManager::Pnpm
    } else if has("yarn.lock") {
        PackageManager::Yarn
    } else if has("bun.lockb") || has("bun.lock") {
        PackageManager::Bun
    } else if has("package-lock.json") {
        PackageManager::Npm
    } else {
        PackageManager::Bun
    }
}

/// Outcome of [`ensure_prettier_plugins`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginResult {
    /// Manifest and lockfiles that a package install touched
    pub touched: Vec<PathBuf>,
    /// Whether the wanted plugins are declared in the manifest
    pub plugins_available: bool,
}

impl PluginResult {
    fn unavailable() -> Self {
        Self::default()
    }

    fn available(touched: Vec<PathBuf>) -> Self {
        Self {
            touched,
            plugins_available: true,
        }
    }
}

fn declares(manifest: &Value, name: &str) -> bool {
    ["dependencies", "devDependencies"]
        .iter()
        .any(|section| manifest.get(section).and_then(|deps| deps.get(name)).is_some())
}

/// Make sure the Prettier plugins the web preset relies on are installed
///
/// Only acts when `web` is selected and a `package.json` exists. Missing
/// plugins are added as dev-dependencies with the project's package manager;
/// a missing binary or a failed install leaves the plugins unavailable.
#[must_use]
pub fn ensure_prettier_plugins(
    system: &dyn System,
    root: &Path,
    presets: &PresetSet,
    astro: bool,
) -> PluginResult {
    if !presets.contains(&Preset::Web) {
        return PluginResult::unavailable();
    }

    let manifest_path = root.join("package.json");
    if !system.exists(&manifest_path) {
        warn!("package.json missing; skipping prettier plugin install");
        return PluginResult::unavailable();
    }
    let manifest = match system
        .read_to_string(&manifest_path)
        .map_err(|err| err.to_string())
        .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|err| err.to_string()))
    {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!("failed to read {}: {err}", manifest_path.display());
            return PluginResult::unavailable();
        }
    };

    let mut wanted = vec![TAILWIND_PLUGIN];
    if astro {
        wanted.push(ASTRO_PLUGIN);
    }
    let missing: Vec<&str> = wanted
        .into_iter()
        .filter(|plugin| !declares(&manifest, plugin))
        .collect();
    if missing.is_empty() {
        debug!("prettier plugins already declared");
        return PluginResult::available(Vec::new());
    }

    let manager = detect_package_manager(system, root, &manifest);
    info!("install: {} ({manager})", missing.join(", "));
    if !system.has_command(manager.program()) {
        warn!("{manager} not found; install {} manually", missing.join(", "));
        return PluginResult::unavailable();
    }

    match system.run_interactive(manager.program(), &manager.add_dev_args(&missing), root) {
        Ok(true) => {}
        Ok(false) => {
            warn!("{manager} failed to install {}", missing.join(", "));
            return PluginResult::unavailable();
        }
        Err(err) => {
            warn!("failed to run {manager}: {err}");
            return PluginResult::unavailable();
        }
    }

    let touched = core::iter::once("package.json")
        .chain(LOCKFILES.iter().copied())
        .map(|name| root.join(name))
        .filter(|path| system.exists(path))
        .collect();
    PluginResult::available(touched)
}

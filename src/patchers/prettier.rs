//! Prettier config plugin list

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use super::deps::{ASTRO_PLUGIN, TAILWIND_PLUGIN};
use crate::error::SyncError;
use crate::presets::{Preset, PresetSet};
use crate::system::System;

pub const PRETTIER_CONFIG: &str = ".prettierrc.json";

const INDENT: usize = 4;
const PRINT_WIDTH: usize = 100;

/// Plugin list the config should carry
///
/// With a manifest the tailwind plugin leads, existing third-party plugins
/// follow in their order and the astro plugin closes the list when the
/// project uses Astro. Without a manifest the managed plugins are dropped.
#[must_use]
pub fn desired_plugins(existing: &[String], has_manifest: bool, astro: bool) -> Vec<String> {
    let managed = |plugin: &String| plugin == TAILWIND_PLUGIN || plugin == ASTRO_PLUGIN;

    if !has_manifest {
        return existing.iter().filter(|plugin| !managed(plugin)).cloned().collect();
    }

    let mut desired = vec![TAILWIND_PLUGIN.to_owned()];
    for plugin in existing.iter().filter(|plugin| !managed(plugin)) {
        if !desired.contains(plugin) {
            desired.push(plugin.clone());
        }
    }
    if astro {
        desired.push(ASTRO_PLUGIN.to_owned());
    }
    desired
}

/// Reconcile the `plugins` array of `.prettierrc.json`
///
/// Only runs for the web preset when the config exists. If the project has a
/// manifest but the plugins could not be installed, the file is left alone.
/// Returns the config path when it was rewritten.
///
/// # Errors
///
/// Returns an error if the rewritten config cannot be written
pub fn update_prettier_plugins(
    system: &dyn System,
    root: &Path,
    presets: &PresetSet,
    astro: bool,
    plugins_available: bool,
) -> Result<Vec<PathBuf>> {
    if !presets.contains(&Preset::Web) {
        return Ok(Vec::new());
    }
    let path = root.join(PRETTIER_CONFIG);
    if !system.is_file(&path) {
        return Ok(Vec::new());
    }
    let has_manifest = system.exists(&root.join("package.json"));
    if has_manifest && !plugins_available {
        return Ok(Vec::new());
    }

    let parsed = system
        .read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|err| err.to_string()));
    let mut config = match parsed {
        Ok(Value::Object(config)) => config,
        Ok(_) => {
            warn!("{} is not a JSON object; skipping plugin update", path.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            warn!("failed to parse {}: {err}; skipping plugin update", path.display());
            return Ok(Vec::new());
        }
    };

    let existing: Vec<String> = config
        .get("plugins")
        .and_then(Value::as_array)
        .map(|plugins| {
            plugins
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let next = desired_plugins(&existing, has_manifest, astro);
    if next == existing {
        return Ok(Vec::new());
    }

    if next.is_empty() {
        config.shift_remove("plugins");
    } else {
        config.insert(
            "plugins".to_owned(),
            Value::Array(next.into_iter().map(Value::String).collect()),
        );
    }

    let rendered = format!("{}\n", format_json(&Value::Object(config), 0));
    system
        .write(&path, rendered.as_bytes())
        .map_err(|err| SyncError::filesystem(format!("Failed to write {}: {err}", path.display())))?;
    info!("update: {}", path.display());
    Ok(vec![path])
}

/// Render JSON with 4-space indentation
///
/// Arrays of strings stay on one line while they fit the print width, the
/// way Prettier lays them out.
#[must_use]
pub fn format_json(value: &Value, indent: usize) -> String {
    let padding = " ".repeat(indent);
    let inner = " ".repeat(indent + INDENT);

    match value {
        Value::Array(items) if items.is_empty() => "[]".to_owned(),
        Value::Array(items) => {
            let inline = format!(
                "[{}]",
                items
                    .iter()
                    .map(|item| format_json(item, 0))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if items.iter().all(Value::is_string) && indent + inline.len() <= PRINT_WIDTH {
                return inline;
            }
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("{inner}{}", format_json(item, indent + INDENT)))
                .collect();
            format!("[\n{}\n{padding}]", lines.join(",\n"))
        }
        Value::Object(map) if map.is_empty() => "{}".to_owned(),
        Value::Object(map) => {
            let lines: Vec<String> = map
                .iter()
                .map(|(key, item)| {
                    format!(
                        "{inner}{}: {}",
                        Value::String(key.clone()),
                        format_json(item, indent + INDENT)
                    )
                })
                .collect();
            format!("{{\n{}\n{padding}}}", lines.join(",\n"))
        }
        scalar => scalar.to_string(),
    }
}

//! Interactive preset selection

use anyhow::{Context as _, Result};
use dialoguer::MultiSelect;
use dialoguer::theme::ColorfulTheme;

use crate::operations::PresetPrompt;

/// Multi-select prompt on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PresetPrompt for TerminalPrompt {
    fn select(&self, choices: &[&str]) -> Result<Vec<String>> {
        let theme = ColorfulTheme::default();
        let picked = MultiSelect::with_theme(&theme)
            .with_prompt("Select configs to install (space to toggle, enter to confirm)")
            .items(choices)
            .interact()
            .context("Failed to read interactive selection")?;

        Ok(picked
            .into_iter()
            .filter_map(|idx| choices.get(idx))
            .map(|choice| (*choice).to_owned())
            .collect())
    }
}

//! User prompt utilities for interactive confirmation

use anyhow::Result;
use dialoguer::Confirm;

/// Ask user for yes/no confirmation
pub fn confirm(prompt: &str) -> Result<bool> {
    let result = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    Ok(result)
}

/// Confirm a destructive action unless `assume_yes` or confirmation is disabled
pub fn confirm_destructive(prompt: &str, assume_yes: bool, require_confirmation: bool) -> Result<bool> {
    if assume_yes || !require_confirmation {
        return Ok(true);
    }
    confirm(prompt)
}

use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use traccia_core::store::settings::KNOWN_KEYS;

use super::{load_config, open_store};

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Store an override (an empty value clears it)
    Set { key: String, value: String },
    /// Show an override
    Get { key: String },
}

pub fn run(config_path: &Path, subcmd: SettingsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SettingsSubcommand::Set { key, value } => {
            check_key(&key)?;
            let store = open_store(&load_config(config_path)?)?;
            store
                .set_setting(&key, &value)
                .with_context(|| format!("failed to save setting '{key}'"))?;
            if json {
                print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("Saved {key}");
            }
            Ok(())
        }
        SettingsSubcommand::Get { key } => {
            check_key(&key)?;
            let store = open_store(&load_config(config_path)?)?;
            let value = store
                .get_setting(&key)
                .with_context(|| format!("failed to read setting '{key}'"))?;
            if json {
                print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("{}", value.as_deref().unwrap_or("(unset)"));
            }
            Ok(())
        }
    }
}

fn check_key(key: &str) -> anyhow::Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        anyhow::bail!(
            "unknown setting '{key}' (expected one of: {})",
            KNOWN_KEYS.join(", ")
        );
    }
    Ok(())
}

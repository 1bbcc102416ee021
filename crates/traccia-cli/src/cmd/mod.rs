pub mod alerts;
pub mod config;
pub mod rules;
pub mod serve;
pub mod settings;
pub mod sync;

use anyhow::Context;
use std::path::Path;
use traccia_core::config::Config;
use traccia_core::store::Store;

pub(crate) fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| format!("failed to load config {}", path.display()))
}

pub(crate) fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = &config.database.path;
    Store::open(path).with_context(|| format!("failed to open database {}", path.display()))
}

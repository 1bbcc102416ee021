use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;
use std::sync::Arc;
use traccia_core::clock::SystemClock;
use traccia_core::jobs::{sync_job, JobContext};

use super::load_config;

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Fetch the directory and merge it into the local employee table
    Run,
}

pub fn run(config_path: &Path, subcmd: SyncSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SyncSubcommand::Run => run_once(config_path, json),
    }
}

/// A failed sync is still a successful command: the outcome is the report.
fn run_once(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let ctx = JobContext::new(load_config(config_path)?, Arc::new(SystemClock));

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(sync_job(&ctx));

    if json {
        print_json(&outcome)?;
    } else if outcome.ok {
        println!(
            "{}: {} created, {} updated",
            outcome.message, outcome.created, outcome.updated
        );
    } else {
        println!("Sync skipped: {}", outcome.message);
    }
    Ok(())
}

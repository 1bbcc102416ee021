use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use traccia_core::clock::SystemClock;
use traccia_core::jobs::{default_jobs, JobContext};
use traccia_core::scheduler::Scheduler;

use super::{load_config, open_store};

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    // Applies the schema up front so a bad database path fails here, not at 02:00.
    drop(open_store(&config)?);

    let ctx = JobContext::new(config, Arc::new(SystemClock));
    let mut scheduler = Scheduler::new(default_jobs(ctx));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        scheduler.start().await.context("failed to start scheduler")?;
        info!(jobs = ?scheduler.job_ids(), "scheduler running; press Ctrl-C to stop");

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;

        info!("shutting down");
        scheduler.stop().await.context("failed to stop scheduler")?;
        Ok::<(), anyhow::Error>(())
    })
}

use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;
use std::sync::Arc;
use traccia_core::clock::{Clock, FixedClock, SystemClock};
use traccia_core::expiry::parse_date;
use traccia_core::jobs::{alert_job, JobContext};

use super::load_config;

#[derive(Subcommand)]
pub enum AlertsSubcommand {
    /// Run one alert pass now
    Run {
        /// Evaluate as if today were this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,
    },
}

pub fn run(config_path: &Path, subcmd: AlertsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AlertsSubcommand::Run { today } => run_once(config_path, today.as_deref(), json),
    }
}

fn run_once(config_path: &Path, today: Option<&str>, json: bool) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = match today {
        Some(day) => Arc::new(FixedClock::on(parse_date(day)?)),
        None => Arc::new(SystemClock),
    };
    let ctx = JobContext::new(load_config(config_path)?, clock);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(alert_job(&ctx))?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("Alerts sent: {}", outcome.sent);
    }
    Ok(())
}

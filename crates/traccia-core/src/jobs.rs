//! The two scheduled jobs, bound to a config and a clock.
//!
//! Each invocation opens its own store connection and drops it when done.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::alerts::run_alerts;
use crate::channels::Channels;
use crate::clock::Clock;
use crate::config::{Config, ALERT_CRON};
use crate::directory::sync_directory;
use crate::error::Result;
use crate::scheduler::JobDefinition;
use crate::store::Store;
use crate::types::{AlertOutcome, SyncOutcome};

pub const DIRECTORY_SYNC_JOB: &str = "directory_sync";
pub const CERT_ALERTS_JOB: &str = "cert_alerts";

#[derive(Clone)]
pub struct JobContext {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
}

impl JobContext {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            clock,
        }
    }
}

/// One directory sync. A store that cannot be opened is reported in the
/// outcome like any other failure.
pub async fn sync_job(ctx: &JobContext) -> SyncOutcome {
    let store = match Store::open(&ctx.config.database.path) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "directory sync could not open the store");
            return SyncOutcome::failed(format!("store unavailable: {e}"));
        }
    };
    let outcome = sync_directory(&store, &ctx.config.directory, ctx.clock.as_ref()).await;
    info!(
        ok = outcome.ok,
        created = outcome.created,
        updated = outcome.updated,
        message = %outcome.message,
        "directory sync finished"
    );
    outcome
}

/// One alert pass over every certification.
pub async fn alert_job(ctx: &JobContext) -> Result<AlertOutcome> {
    let store = Store::open(&ctx.config.database.path)?;
    let channels = Channels::from_config(&ctx.config)?;
    run_alerts(&store, &channels, ctx.clock.as_ref()).await
}

/// Directory sync on its configured cadence, alerts daily at 03:15 UTC.
pub fn default_jobs(ctx: JobContext) -> Vec<JobDefinition> {
    let sync_ctx = ctx.clone();
    let sync = JobDefinition::new(
        DIRECTORY_SYNC_JOB,
        ctx.config.directory.sync_cron.clone(),
        move || {
            let ctx = sync_ctx.clone();
            async move {
                sync_job(&ctx).await;
            }
        },
    );

    let alerts = JobDefinition::new(CERT_ALERTS_JOB, ALERT_CRON, move || {
        let ctx = ctx.clone();
        async move {
            if let Err(e) = alert_job(&ctx).await {
                error!(error = %e, "alert run failed");
            }
        }
    });

    vec![sync, alerts]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::NewCertification;
    use chrono::{Days, NaiveDate};
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> JobContext {
        let mut config = Config::default();
        config.database.path = dir.path().join("jobs.db");
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        JobContext::new(config, Arc::new(FixedClock::on(today)))
    }

    #[test]
    fn default_jobs_cover_sync_and_alerts() {
        let dir = TempDir::new().unwrap();
        let jobs = default_jobs(context(&dir));
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec![DIRECTORY_SYNC_JOB, CERT_ALERTS_JOB]);
        assert_eq!(jobs[0].cron, "0 2 * * *");
        assert_eq!(jobs[1].cron, ALERT_CRON);
    }

    #[tokio::test]
    async fn sync_job_without_directory_reports_missing_config() {
        let dir = TempDir::new().unwrap();
        let outcome = sync_job(&context(&dir)).await;
        assert_eq!(outcome, SyncOutcome::failed("directory config missing"));
    }

    #[tokio::test]
    async fn alert_job_opens_its_own_store() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let today = ctx.clock.today();
        {
            let store = Store::open(&ctx.config.database.path).unwrap();
            let emp = store.insert_employee("Anna", "Bianchi", None).unwrap();
            store
                .insert_certification(&NewCertification {
                    employee_id: emp,
                    cert_type: "ladder".into(),
                    title: "Lavori in quota".into(),
                    issued_date: None,
                    expiry_date: today + Days::new(14),
                })
                .unwrap();
        }

        assert_eq!(alert_job(&ctx).await.unwrap().sent, 1);
        assert_eq!(alert_job(&ctx).await.unwrap().sent, 0);
    }

    #[tokio::test]
    async fn job_closures_run_to_completion() {
        let dir = TempDir::new().unwrap();
        for job in default_jobs(context(&dir)) {
            (job.run)().await;
        }
        assert!(dir.path().join("jobs.db").exists());
    }
}

//! Cron scheduler for the background jobs.
//!
//! A `Scheduler` is built from explicit job definitions and started and
//! stopped by its owner. Every job is single-flight: a tick that arrives
//! while the previous run of the same job is still active is skipped. A
//! job that panics is logged and the scheduler keeps ticking.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::error::{Result, TracciaError};

pub type JobFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Accept standard five-field cron (`min hour dom mon dow`) as well as the
/// seconds-first six/seven-field form, returning the seconds-first form.
pub fn normalize_cron(expr: &str) -> Result<String> {
    let invalid = |reason: String| TracciaError::InvalidCron {
        expr: expr.to_string(),
        reason,
    };

    let fields: Vec<&str> = expr.split_whitespace().collect();
    if let Some(bad) = fields.iter().find(|f| {
        !f.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '*' | ',' | '-' | '/' | '?' | '#'))
    }) {
        return Err(invalid(format!("unexpected token '{bad}'")));
    }

    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        n => Err(invalid(format!("expected 5 fields, found {n}"))),
    }
}

// ---------------------------------------------------------------------------
// JobDefinition
// ---------------------------------------------------------------------------

pub struct JobDefinition {
    pub id: String,
    pub cron: String,
    pub run: JobFn,
}

impl JobDefinition {
    pub fn new<F, Fut>(id: impl Into<String>, cron: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            id: id.into(),
            cron: cron.into(),
            run: Arc::new(move || run().boxed()),
        }
    }
}

// ---------------------------------------------------------------------------
// SingleFlight
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Completed,
    Skipped,
    Panicked,
}

/// Guard ensuring at most one active run per job.
#[derive(Clone)]
pub struct SingleFlight {
    job_id: Arc<str>,
    lock: Arc<Mutex<()>>,
}

impl SingleFlight {
    pub fn new(job_id: &str) -> Self {
        Self {
            job_id: Arc::from(job_id),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run `job` unless a previous run is still active. The job executes on
    /// its own task so a panic is contained and reported.
    pub async fn run(&self, job: BoxFuture<'static, ()>) -> RunState {
        let Ok(_guard) = self.lock.try_lock() else {
            warn!(job = %self.job_id, "previous run still active; tick skipped");
            return RunState::Skipped;
        };
        match tokio::spawn(job).await {
            Ok(()) => RunState::Completed,
            Err(e) => {
                error!(job = %self.job_id, error = %e, "job aborted");
                RunState::Panicked
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct Scheduler {
    jobs: Vec<JobDefinition>,
    inner: Option<JobScheduler>,
}

impl Scheduler {
    pub fn new(jobs: Vec<JobDefinition>) -> Self {
        Self { jobs, inner: None }
    }

    pub fn job_ids(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.id.as_str()).collect()
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_some()
    }

    /// Register every job and start ticking. Starting twice is a no-op.
    pub async fn start(&mut self) -> Result<()> {
        if self.inner.is_some() {
            return Ok(());
        }

        let sched = JobScheduler::new()
            .await
            .map_err(|e| TracciaError::Scheduler(format!("creating scheduler: {e}")))?;

        for def in &self.jobs {
            let cron = normalize_cron(&def.cron)?;
            let flight = SingleFlight::new(&def.id);
            let run = def.run.clone();
            let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
                let flight = flight.clone();
                let run = run.clone();
                Box::pin(async move {
                    flight.run(run()).await;
                })
            })
            .map_err(|e| TracciaError::Scheduler(format!("creating job '{}': {e}", def.id)))?;
            sched
                .add(job)
                .await
                .map_err(|e| TracciaError::Scheduler(format!("adding job '{}': {e}", def.id)))?;
            info!(job = %def.id, cron = %cron, "job scheduled");
        }

        sched
            .start()
            .await
            .map_err(|e| TracciaError::Scheduler(format!("starting scheduler: {e}")))?;
        self.inner = Some(sched);
        Ok(())
    }

    /// Stop ticking. In-flight runs are not awaited.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(mut sched) = self.inner.take() {
            sched
                .shutdown()
                .await
                .map_err(|e| TracciaError::Scheduler(format!("stopping scheduler: {e}")))?;
            info!("scheduler stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[test]
    fn five_field_cron_gains_seconds() {
        assert_eq!(normalize_cron("0 2 * * *").unwrap(), "0 0 2 * * *");
        assert_eq!(normalize_cron(" 15  3 * * * ").unwrap(), "0 15 3 * * *");
        assert_eq!(normalize_cron("*/5 * * * * *").unwrap(), "*/5 * * * * *");
    }

    #[test]
    fn malformed_cron_is_rejected() {
        assert!(matches!(
            normalize_cron("every day"),
            Err(TracciaError::InvalidCron { .. })
        ));
        assert!(normalize_cron("0 2 * * * ; rm").is_err());
        assert!(normalize_cron("").is_err());
    }

    #[tokio::test]
    async fn overlapping_tick_is_skipped() {
        let flight = SingleFlight::new("alerts");
        let release = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());

        let first = {
            let flight = flight.clone();
            let release = release.clone();
            let started = started.clone();
            tokio::spawn(async move {
                flight
                    .run(Box::pin(async move {
                        started.notify_one();
                        release.notified().await;
                    }))
                    .await
            })
        };
        started.notified().await;

        let second = flight.run(Box::pin(async {})).await;
        assert_eq!(second, RunState::Skipped);

        release.notify_one();
        assert_eq!(first.await.unwrap(), RunState::Completed);

        let third = flight.run(Box::pin(async {})).await;
        assert_eq!(third, RunState::Completed);
    }

    #[tokio::test]
    async fn panicking_job_releases_the_guard() {
        let flight = SingleFlight::new("sync");
        let state = flight
            .run(Box::pin(async {
                panic!("directory exploded");
            }))
            .await;
        assert_eq!(state, RunState::Panicked);
        assert_eq!(flight.run(Box::pin(async {})).await, RunState::Completed);
    }

    #[tokio::test]
    async fn invalid_cron_fails_start() {
        let mut scheduler = Scheduler::new(vec![JobDefinition::new("bad", "nope", || async {})]);
        assert!(scheduler.start().await.is_err());
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn scheduled_job_runs_until_stopped() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let mut scheduler = Scheduler::new(vec![JobDefinition::new(
            "tick",
            "* * * * * *",
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
        )]);
        assert_eq!(scheduler.job_ids(), vec!["tick"]);

        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(3500)).await;
        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());

        assert!(count.load(Ordering::SeqCst) >= 1);
    }
}

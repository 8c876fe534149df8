//! Background job scheduler.
//!
//! [`Scheduler`] owns the run state of the four recurring jobs and the run
//! lock that keeps them from overlapping. [`Scheduler::start`] registers each
//! job with a [`JobScheduler`], the single timer loop; manual triggers call
//! [`Scheduler::run_now`] directly and share the same lock.

mod jobs;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;
use vgate_collab::Collaborator;
use vgate_core::app_config::ScheduleConfig;
use vgate_core::{Cadence, NichesFile, RepurposedContent};
use vgate_pipeline::{LedgerSummary, Pipeline, PipelineError, WeeklyPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    DailyGeneration,
    DailyTracking,
    WeeklyPlanning,
    WeeklyAnalysis,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::DailyGeneration,
        JobKind::DailyTracking,
        JobKind::WeeklyPlanning,
        JobKind::WeeklyAnalysis,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::DailyGeneration => "daily_generation",
            JobKind::DailyTracking => "daily_tracking",
            JobKind::WeeklyPlanning => "weekly_planning",
            JobKind::WeeklyAnalysis => "weekly_analysis",
        }
    }

    /// Accepts `daily_generation` or `daily-generation`, any case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|job| job.as_str() == normalized)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobResult {
    Completed { summary: String },
    /// The same job was already running when this trigger arrived.
    Skipped { reason: String },
    /// Cancelled mid-run; work finished before cancellation is kept.
    Cancelled { summary: String },
    Failed { error: String },
}

impl std::fmt::Display for JobResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobResult::Completed { summary } => write!(f, "completed: {summary}"),
            JobResult::Skipped { reason } => write!(f, "skipped: {reason}"),
            JobResult::Cancelled { summary } => write!(f, "cancelled: {summary}"),
            JobResult::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub state: JobState,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
    pub last_result: Option<JobResult>,
}

#[derive(Debug, Default)]
struct JobSlot {
    /// Present while the job is claimed (running or waiting on the run lock).
    running: Option<CancellationToken>,
    last_run: Option<DateTime<Utc>>,
    last_result: Option<JobResult>,
}

#[derive(Debug, Default)]
struct Reports {
    plan: Option<WeeklyPlan>,
    summary: Option<LedgerSummary>,
}

pub struct Scheduler<C> {
    pipeline: Arc<Pipeline<C>>,
    niches: NichesFile,
    schedule: ScheduleConfig,
    slots: Mutex<[JobSlot; 4]>,
    reports: Mutex<Reports>,
    run_lock: tokio::sync::Mutex<()>,
    shutdown: CancellationToken,
}

impl<C: Collaborator> Scheduler<C> {
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline<C>>, niches: NichesFile, schedule: ScheduleConfig) -> Self {
        Self {
            pipeline,
            niches,
            schedule,
            slots: Mutex::new(Default::default()),
            reports: Mutex::new(Reports::default()),
            run_lock: tokio::sync::Mutex::new(()),
            shutdown: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline<C> {
        &self.pipeline
    }

    #[must_use]
    pub fn cadence(&self, job: JobKind) -> &Cadence {
        match job {
            JobKind::DailyGeneration => &self.schedule.generation,
            JobKind::DailyTracking => &self.schedule.tracking,
            JobKind::WeeklyPlanning => &self.schedule.planning,
            JobKind::WeeklyAnalysis => &self.schedule.analysis,
        }
    }

    fn slots(&self) -> MutexGuard<'_, [JobSlot; 4]> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reports(&self) -> MutexGuard<'_, Reports> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn status(&self) -> BTreeMap<JobKind, JobStatus> {
        self.status_at(Utc::now())
    }

    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> BTreeMap<JobKind, JobStatus> {
        let slots = self.slots();
        JobKind::ALL
            .into_iter()
            .map(|job| {
                let slot = &slots[job.index()];
                let status = JobStatus {
                    state: if slot.running.is_some() {
                        JobState::Running
                    } else {
                        JobState::Idle
                    },
                    last_run: slot.last_run,
                    next_run: self.cadence(job).next_after(now),
                    last_result: slot.last_result.clone(),
                };
                (job, status)
            })
            .collect()
    }

    /// The plan produced by the most recent weekly planning run.
    #[must_use]
    pub fn latest_plan(&self) -> Option<WeeklyPlan> {
        self.reports().plan.clone()
    }

    /// The summary produced by the most recent weekly analysis run.
    #[must_use]
    pub fn latest_summary(&self) -> Option<LedgerSummary> {
        self.reports().summary.clone()
    }

    /// Run `job` now, bypassing its cadence.
    ///
    /// A trigger for a job that is already running is skipped. Different
    /// jobs queue on the run lock and execute one at a time.
    pub async fn run_now(&self, job: JobKind) -> JobResult {
        let cancel = {
            let mut slots = self.slots();
            let slot = &mut slots[job.index()];
            if slot.running.is_some() {
                let skipped = JobResult::Skipped {
                    reason: "previous run still in progress".to_string(),
                };
                slot.last_result = Some(skipped.clone());
                tracing::warn!(job = %job, "scheduler: trigger skipped; job already running");
                return skipped;
            }
            let token = self.shutdown.child_token();
            slot.running = Some(token.clone());
            token
        };

        let guard = self.run_lock.lock().await;
        let started = Utc::now();
        tracing::info!(job = %job, "scheduler: starting run");
        let result = if cancel.is_cancelled() {
            JobResult::Cancelled {
                summary: "cancelled before start".to_string(),
            }
        } else {
            self.execute(job, started, &cancel).await
        };
        drop(guard);

        {
            let mut slots = self.slots();
            let slot = &mut slots[job.index()];
            slot.running = None;
            slot.last_run = Some(started);
            slot.last_result = Some(result.clone());
        }

        match &result {
            JobResult::Failed { error } => {
                tracing::error!(job = %job, error = %error, "scheduler: run failed");
            }
            other => tracing::info!(job = %job, result = %other, "scheduler: run complete"),
        }
        result
    }

    /// Cancel the in-flight run of `job`. Returns whether one was running.
    pub fn cancel(&self, job: JobKind) -> bool {
        let slots = self.slots();
        match &slots[job.index()].running {
            Some(token) => {
                token.cancel();
                tracing::info!(job = %job, "scheduler: cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight run and refuse new work.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Operator-triggered generation for one idea. Shares the run lock with
    /// scheduled jobs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for an invalid channel count or blank niche.
    pub async fn manual_generate(
        &self,
        niche: &str,
        channel_count: usize,
    ) -> Result<Vec<RepurposedContent>, PipelineError> {
        let cancel = self.shutdown.child_token();
        let _guard = self.run_lock.lock().await;
        tracing::info!(niche, channel_count, "scheduler: manual generation");
        self.pipeline
            .manual_generate(niche, channel_count, &cancel)
            .await
    }
}

impl<C: Collaborator + 'static> Scheduler<C> {
    /// Register every job on its cadence and start the timer loop.
    ///
    /// The returned [`JobScheduler`] must be kept alive for the lifetime of
    /// the process; dropping it stops all scheduled jobs.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
    /// a job cannot be registered, or the scheduler fails to start.
    pub async fn start(self: &Arc<Self>) -> Result<JobScheduler, JobSchedulerError> {
        let cron = JobScheduler::new().await?;
        for job in JobKind::ALL {
            register_job(&cron, Arc::clone(self), job).await?;
        }
        cron.start().await?;
        Ok(cron)
    }
}

async fn register_job<C: Collaborator + 'static>(
    cron: &JobScheduler,
    scheduler: Arc<Scheduler<C>>,
    job: JobKind,
) -> Result<(), JobSchedulerError> {
    let cadence = *scheduler.cadence(job);
    let expression = cadence.to_cron();

    let task = Job::new_async(expression.as_str(), move |_uuid, _lock| {
        let scheduler = Arc::clone(&scheduler);
        Box::pin(async move {
            tracing::info!(job = %job, "scheduler: cadence trigger");
            scheduler.run_now(job).await;
        })
    })?;

    cron.add(task).await?;
    tracing::info!(job = %job, cadence = %cadence, cron = %expression, "scheduler: registered job");
    Ok(())
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;

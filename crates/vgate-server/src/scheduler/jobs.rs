//! Bodies of the four recurring jobs.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use vgate_collab::Collaborator;
use vgate_pipeline::{niche_for_day, plan_week};

use super::{JobKind, JobResult, Scheduler};

impl<C: Collaborator> Scheduler<C> {
    pub(super) async fn execute(
        &self,
        job: JobKind,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> JobResult {
        match job {
            JobKind::DailyGeneration => self.run_generation(now, cancel).await,
            JobKind::DailyTracking => self.run_tracking(now, cancel).await,
            JobKind::WeeklyPlanning => self.run_planning(now),
            JobKind::WeeklyAnalysis => self.run_analysis(now).await,
        }
    }

    async fn run_generation(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> JobResult {
        let Some(niche) = niche_for_day(&self.niches, now.date_naive()) else {
            return JobResult::Failed {
                error: "niche catalogue is empty".to_string(),
            };
        };

        match self.pipeline.run_daily(&niche.name, cancel).await {
            Ok(report) if report.cancelled => JobResult::Cancelled {
                summary: report.to_string(),
            },
            Ok(report) => JobResult::Completed {
                summary: report.to_string(),
            },
            Err(e) => JobResult::Failed {
                error: e.to_string(),
            },
        }
    }

    async fn run_tracking(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> JobResult {
        match self.pipeline.track(now, cancel).await {
            Ok(report) if report.cancelled => JobResult::Cancelled {
                summary: report.to_string(),
            },
            Ok(report) => JobResult::Completed {
                summary: report.to_string(),
            },
            Err(e) => JobResult::Failed {
                error: e.to_string(),
            },
        }
    }

    fn run_planning(&self, now: DateTime<Utc>) -> JobResult {
        let plan = plan_week(&self.niches, now.date_naive());
        for day in &plan.days {
            tracing::info!(
                date = %day.date,
                niche = %day.niche,
                keywords = day.keywords.len(),
                "scheduler: planned day"
            );
        }
        let summary = plan.to_string();
        self.reports().plan = Some(plan);
        JobResult::Completed { summary }
    }

    async fn run_analysis(&self, now: DateTime<Utc>) -> JobResult {
        match self.pipeline.analyze(now).await {
            Ok(summary) => {
                for channel in &summary.channels {
                    tracing::info!(
                        channel = %channel.channel,
                        rows = channel.rows,
                        views = channel.views,
                        revenue = channel.revenue,
                        "scheduler: weekly channel performance"
                    );
                }
                let line = summary.to_string();
                self.reports().summary = Some(summary);
                JobResult::Completed { summary: line }
            }
            Err(e) => JobResult::Failed {
                error: e.to_string(),
            },
        }
    }
}

//! Generate → gate → fan-out → simulate → persist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vgate_collab::{Collaborator, Guarded};
use vgate_core::{AppConfig, Channel, ContentIdea, PerformanceRecord, RepurposedContent};

use crate::analysis::{summarize_week, LedgerSummary};
use crate::error::{LedgerError, PipelineError};
use crate::ledger::LedgerHandle;
use crate::quality::{QualityAssessment, QualityAssessor, RegenerationPolicy};
use crate::repurpose::{ChannelOutcome, RepurposingEngine};
use crate::simulator::PerformanceSimulator;
use crate::tracking::TrackingReport;

/// Runtime knobs for a [`Pipeline`], usually taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub threshold: f64,
    pub regeneration: RegenerationPolicy,
    pub channel_regenerations: u32,
    /// Never empty.
    pub channels: Vec<Channel>,
    pub ideas_per_run: usize,
    pub seed: Option<u64>,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            threshold: config.quality_threshold,
            regeneration: RegenerationPolicy {
                max_attempts: config.max_regenerations,
            },
            channel_regenerations: config.channel_regenerations,
            channels: config.channels.clone(),
            ideas_per_run: config.ideas_per_run,
            seed: config.simulation_seed,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            regeneration: RegenerationPolicy::default(),
            channel_regenerations: 1,
            channels: Channel::ALL.to_vec(),
            ideas_per_run: 3,
            seed: None,
        }
    }
}

/// Result of gating one idea slot.
#[derive(Debug, Clone, PartialEq)]
pub enum IdeaOutcome {
    Accepted {
        idea: ContentIdea,
        assessment: QualityAssessment,
        regenerations: u32,
    },
    /// Failed the gate with regeneration disabled.
    Rejected {
        idea_id: Uuid,
        assessment: QualityAssessment,
    },
    RegenerationLimitExceeded {
        attempts: u32,
        last: QualityAssessment,
    },
    Cancelled,
}

/// Counters for one generation run, plus the variants that were produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub niche: String,
    pub ideas_requested: usize,
    pub ideas_accepted: usize,
    pub ideas_rejected: usize,
    pub regeneration_limited: usize,
    pub variants_accepted: usize,
    pub variants_dropped: usize,
    pub records_written: usize,
    pub write_failures: usize,
    pub cancelled: bool,
    #[serde(skip)]
    pub variants: Vec<RepurposedContent>,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "niche '{}': {}/{} ideas accepted, {} variants, {} rows written",
            self.niche,
            self.ideas_accepted,
            self.ideas_requested,
            self.variants_accepted,
            self.records_written
        )?;
        if self.write_failures > 0 {
            write!(f, ", {} write failures", self.write_failures)?;
        }
        if self.cancelled {
            f.write_str(" (cancelled)")?;
        }
        Ok(())
    }
}

pub struct Pipeline<C> {
    collab: Arc<Guarded<C>>,
    assessor: QualityAssessor<C>,
    engine: RepurposingEngine<C>,
    simulator: PerformanceSimulator,
    ledger: LedgerHandle,
    settings: PipelineSettings,
}

impl<C: Collaborator> Pipeline<C> {
    #[must_use]
    pub fn new(collab: Arc<Guarded<C>>, ledger: LedgerHandle, settings: PipelineSettings) -> Self {
        let simulator = PerformanceSimulator::new(settings.seed);
        let engine = RepurposingEngine::new(
            Arc::clone(&collab),
            simulator,
            settings.threshold,
            settings.regeneration.bounded(settings.channel_regenerations),
        );
        Self {
            assessor: QualityAssessor::new(Arc::clone(&collab)),
            collab,
            engine,
            simulator,
            ledger,
            settings,
        }
    }

    #[must_use]
    pub fn collaborator(&self) -> &Guarded<C> {
        &self.collab
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    #[must_use]
    pub fn ledger(&self) -> &LedgerHandle {
        &self.ledger
    }

    #[must_use]
    pub fn simulator(&self) -> PerformanceSimulator {
        self.simulator
    }

    /// Generate one idea for `niche` and gate it, regenerating with an
    /// increasing quality bias until it passes or the cap is reached.
    pub async fn gate_idea(&self, niche: &str, cancel: &CancellationToken) -> IdeaOutcome {
        let threshold = self.settings.threshold;
        let cap = self.settings.regeneration.max_attempts;
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return IdeaOutcome::Cancelled;
            }

            let idea = self.collab.generate_idea(niche, attempt).await.value;
            let assessment = self.assessor.assess(&idea, threshold).await;

            if assessment.passed {
                tracing::debug!(
                    niche,
                    idea_id = %idea.id,
                    quality = assessment.score,
                    regenerations = attempt,
                    "idea passed quality gate"
                );
                return IdeaOutcome::Accepted {
                    idea,
                    assessment,
                    regenerations: attempt,
                };
            }

            if cap == 0 {
                tracing::info!(
                    niche,
                    idea_id = %idea.id,
                    quality = assessment.score,
                    reason = %assessment.reason,
                    "idea rejected by quality gate"
                );
                return IdeaOutcome::Rejected {
                    idea_id: idea.id,
                    assessment,
                };
            }

            if attempt >= cap {
                tracing::warn!(
                    niche,
                    attempts = attempt,
                    quality = assessment.score,
                    reason = %assessment.reason,
                    "idea regeneration limit exceeded"
                );
                return IdeaOutcome::RegenerationLimitExceeded {
                    attempts: attempt,
                    last: assessment,
                };
            }

            attempt += 1;
            tracing::debug!(niche, attempt, reason = %assessment.reason, "regenerating idea");
        }
    }

    /// Run `idea_count` idea slots for `niche` across `channels`, persisting
    /// every accepted variant. Cancellation stops new slots; rows already
    /// written stay written.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyNiche`] for a blank niche. Ledger write
    /// failures are counted in the report, not returned.
    pub async fn generate(
        &self,
        niche: &str,
        idea_count: usize,
        channels: &[Channel],
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let niche = niche.trim();
        if niche.is_empty() {
            return Err(PipelineError::EmptyNiche);
        }

        let mut report = RunReport {
            niche: niche.to_string(),
            ideas_requested: idea_count,
            ..RunReport::default()
        };

        for _ in 0..idea_count {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let idea = match self.gate_idea(niche, cancel).await {
                IdeaOutcome::Accepted { idea, .. } => idea,
                IdeaOutcome::Rejected { .. } => {
                    report.ideas_rejected += 1;
                    continue;
                }
                IdeaOutcome::RegenerationLimitExceeded { .. } => {
                    report.regeneration_limited += 1;
                    continue;
                }
                IdeaOutcome::Cancelled => {
                    report.cancelled = true;
                    break;
                }
            };
            report.ideas_accepted += 1;

            for (_, outcome) in self.engine.fan_out(&idea, channels, cancel).await {
                match outcome {
                    ChannelOutcome::Accepted(variant) => {
                        report.variants_accepted += 1;
                        let record = PerformanceRecord::from_variant(&variant, Utc::now());
                        if self.ledger.append(record).await {
                            report.records_written += 1;
                        } else {
                            report.write_failures += 1;
                        }
                        report.variants.push(variant);
                    }
                    ChannelOutcome::Cancelled => report.cancelled = true,
                    ChannelOutcome::Rejected { .. }
                    | ChannelOutcome::RegenerationLimitExceeded { .. } => {
                        report.variants_dropped += 1;
                    }
                }
            }
        }

        tracing::info!(
            niche,
            ideas_accepted = report.ideas_accepted,
            variants = report.variants_accepted,
            rows = report.records_written,
            cancelled = report.cancelled,
            "generation run finished"
        );
        Ok(report)
    }

    /// One idea across the first `channel_count` configured channels.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidChannelCount`] when `channel_count` is
    /// zero or larger than the configured channel set, and
    /// [`PipelineError::EmptyNiche`] for a blank niche.
    pub async fn manual_generate(
        &self,
        niche: &str,
        channel_count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepurposedContent>, PipelineError> {
        let max = self.settings.channels.len();
        if channel_count == 0 || channel_count > max {
            return Err(PipelineError::InvalidChannelCount {
                requested: channel_count,
                max,
            });
        }
        let channels = &self.settings.channels[..channel_count];
        let report = self.generate(niche, 1, channels, cancel).await?;
        Ok(report.variants)
    }

    /// The scheduled generation run: `ideas_per_run` ideas over all
    /// configured channels.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::generate`].
    pub async fn run_daily(
        &self,
        niche: &str,
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        self.generate(
            niche,
            self.settings.ideas_per_run,
            &self.settings.channels,
            cancel,
        )
        .await
    }

    /// Re-simulate today's content. See [`crate::tracking::track_today`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the ledger cannot be scanned.
    pub async fn track(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<TrackingReport, LedgerError> {
        crate::tracking::track_today(
            &self.ledger,
            &self.simulator,
            self.settings.threshold,
            now,
            cancel,
        )
        .await
    }

    /// Summary of the seven days ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the ledger cannot be scanned.
    pub async fn analyze(&self, now: DateTime<Utc>) -> Result<LedgerSummary, LedgerError> {
        let records = self.ledger.read_all().await?;
        Ok(summarize_week(&records, now))
    }
}

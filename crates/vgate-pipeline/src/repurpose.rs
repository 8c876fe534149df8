//! Fan-out of an accepted idea across distribution channels.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vgate_collab::{Collaborator, Guarded};
use vgate_core::{Channel, ContentIdea, RepurposedContent};

use crate::quality::{QualityAssessor, RegenerationPolicy};
use crate::simulator::PerformanceSimulator;

/// What happened to one channel slot during fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutcome {
    Accepted(RepurposedContent),
    /// Failed the gate with regeneration disabled.
    Rejected { score: f64 },
    /// Failed the gate on every allowed attempt.
    RegenerationLimitExceeded { attempts: u32, last_score: f64 },
    /// Skipped because the run was cancelled before this slot started.
    Cancelled,
}

impl ChannelOutcome {
    #[must_use]
    pub fn accepted(&self) -> Option<&RepurposedContent> {
        match self {
            ChannelOutcome::Accepted(content) => Some(content),
            _ => None,
        }
    }
}

pub struct RepurposingEngine<C> {
    collab: Arc<Guarded<C>>,
    assessor: QualityAssessor<C>,
    simulator: PerformanceSimulator,
    threshold: f64,
    regeneration: RegenerationPolicy,
}

impl<C: Collaborator> RepurposingEngine<C> {
    /// `regeneration` is the per-channel budget, already bounded by the
    /// global cap (see [`RegenerationPolicy::bounded`]).
    #[must_use]
    pub fn new(
        collab: Arc<Guarded<C>>,
        simulator: PerformanceSimulator,
        threshold: f64,
        regeneration: RegenerationPolicy,
    ) -> Self {
        let assessor = QualityAssessor::new(Arc::clone(&collab));
        Self {
            collab,
            assessor,
            simulator,
            threshold,
            regeneration,
        }
    }

    /// Accepted variants only, in channel order.
    pub async fn repurpose(
        &self,
        idea: &ContentIdea,
        channels: &[Channel],
        cancel: &CancellationToken,
    ) -> Vec<RepurposedContent> {
        self.fan_out(idea, channels, cancel)
            .await
            .into_iter()
            .filter_map(|(_, outcome)| match outcome {
                ChannelOutcome::Accepted(content) => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Process every channel concurrently. Duplicate channels are ignored.
    pub async fn fan_out(
        &self,
        idea: &ContentIdea,
        channels: &[Channel],
        cancel: &CancellationToken,
    ) -> Vec<(Channel, ChannelOutcome)> {
        let mut unique: Vec<Channel> = Vec::with_capacity(channels.len());
        for channel in channels {
            if !unique.contains(channel) {
                unique.push(*channel);
            }
        }

        let slots = unique.iter().map(|&channel| async move {
            (channel, self.process_channel(idea, channel, cancel).await)
        });
        futures::future::join_all(slots).await
    }

    async fn process_channel(
        &self,
        idea: &ContentIdea,
        channel: Channel,
        cancel: &CancellationToken,
    ) -> ChannelOutcome {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                tracing::info!(idea_id = %idea.id, %channel, "fan-out cancelled before channel work");
                return ChannelOutcome::Cancelled;
            }

            let adaptation = self
                .collab
                .adapt_for_channel(idea, channel, attempt)
                .await
                .value;
            let assessment = self
                .assessor
                .assess_variant(idea.viral_potential, &adaptation, channel, self.threshold)
                .await;

            if assessment.passed {
                let metrics = self.simulator.simulate(
                    idea.id,
                    channel,
                    idea.viral_potential,
                    assessment.score,
                );
                tracing::debug!(
                    idea_id = %idea.id,
                    %channel,
                    quality = assessment.score,
                    views = metrics.views,
                    regenerations = attempt,
                    "variant accepted"
                );
                return ChannelOutcome::Accepted(RepurposedContent {
                    source_idea_id: idea.id,
                    channel,
                    title: adaptation.title,
                    description: adaptation.description,
                    viral_potential: idea.viral_potential,
                    quality_score: assessment.score,
                    metrics,
                    created_at: idea.created_at,
                });
            }

            if self.regeneration.max_attempts == 0 {
                tracing::info!(
                    idea_id = %idea.id,
                    %channel,
                    quality = assessment.score,
                    reason = %assessment.reason,
                    "variant rejected by quality gate"
                );
                return ChannelOutcome::Rejected {
                    score: assessment.score,
                };
            }

            if attempt >= self.regeneration.max_attempts {
                tracing::warn!(
                    idea_id = %idea.id,
                    %channel,
                    attempts = attempt,
                    quality = assessment.score,
                    "variant regeneration limit exceeded; dropping channel"
                );
                return ChannelOutcome::RegenerationLimitExceeded {
                    attempts: attempt,
                    last_score: assessment.score,
                };
            }

            attempt += 1;
            tracing::debug!(idea_id = %idea.id, %channel, attempt, "regenerating channel adaptation");
        }
    }
}

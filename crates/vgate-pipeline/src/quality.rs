//! Quality gate for raw ideas and channel variants.

use std::sync::Arc;

use vgate_collab::{Adaptation, Collaborator, Guarded, Source};
use vgate_core::{clamp_unit, Channel, ContentIdea};

const VIRAL_WEIGHT: f64 = 0.4;
const ENGAGEMENT_WEIGHT: f64 = 0.4;
const ADAPTATION_WEIGHT: f64 = 0.2;

/// Weighted composite used for channel variants, clamped to `[0, 1]`.
#[must_use]
pub fn composite_quality(
    viral_potential: f64,
    engagement_likelihood: f64,
    adaptation_quality: f64,
) -> f64 {
    clamp_unit(
        VIRAL_WEIGHT * viral_potential
            + ENGAGEMENT_WEIGHT * engagement_likelihood
            + ADAPTATION_WEIGHT * adaptation_quality,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentReason {
    /// Fast reject: viral potential alone is under the threshold.
    BelowThreshold,
    Passed,
    /// Assessed, but the quality score is under the threshold.
    FailedQuality,
}

impl AssessmentReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentReason::BelowThreshold => "below-threshold",
            AssessmentReason::Passed => "passed",
            AssessmentReason::FailedQuality => "failed-quality",
        }
    }
}

impl std::fmt::Display for AssessmentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityAssessment {
    pub passed: bool,
    pub score: f64,
    pub reason: AssessmentReason,
    /// `None` when no external call was made (fast reject).
    pub source: Option<Source>,
}

impl QualityAssessment {
    fn gate(score: f64, threshold: f64, source: Source) -> Self {
        let passed = score >= threshold;
        Self {
            passed,
            score,
            reason: if passed {
                AssessmentReason::Passed
            } else {
                AssessmentReason::FailedQuality
            },
            source: Some(source),
        }
    }
}

/// Cap on regeneration attempts after a failed gate. Zero disables regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationPolicy {
    pub max_attempts: u32,
}

impl Default for RegenerationPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RegenerationPolicy {
    /// A per-channel budget bounded by this policy's cap.
    #[must_use]
    pub fn bounded(self, requested: u32) -> Self {
        Self {
            max_attempts: requested.min(self.max_attempts),
        }
    }
}

/// Scores ideas and variants through the guarded collaborator.
pub struct QualityAssessor<C> {
    collab: Arc<Guarded<C>>,
}

impl<C> Clone for QualityAssessor<C> {
    fn clone(&self) -> Self {
        Self {
            collab: Arc::clone(&self.collab),
        }
    }
}

impl<C: Collaborator> QualityAssessor<C> {
    #[must_use]
    pub fn new(collab: Arc<Guarded<C>>) -> Self {
        Self { collab }
    }

    /// Gate a raw idea. Never fails: collaborator errors fall back to the
    /// idea's viral potential as the quality score.
    pub async fn assess(&self, idea: &ContentIdea, threshold: f64) -> QualityAssessment {
        let viral_potential = clamp_unit(idea.viral_potential);
        if viral_potential < threshold {
            return QualityAssessment {
                passed: false,
                score: viral_potential,
                reason: AssessmentReason::BelowThreshold,
                source: None,
            };
        }

        let scored = self
            .collab
            .assess_quality(&idea.assessment_text(), "idea", viral_potential)
            .await;
        QualityAssessment::gate(scored.value, threshold, scored.source)
    }

    /// Gate a channel variant on the weighted composite of viral potential,
    /// engagement likelihood and adaptation quality.
    pub async fn assess_variant(
        &self,
        viral_potential: f64,
        adaptation: &Adaptation,
        channel: Channel,
        threshold: f64,
    ) -> QualityAssessment {
        let viral_potential = clamp_unit(viral_potential);
        let text = format!("{}\n\n{}", adaptation.title, adaptation.description);
        let engagement_context = format!("engagement:{channel}");
        let adaptation_context = format!("adaptation:{channel}");

        let (engagement, adaptation_quality) = tokio::join!(
            self.collab
                .assess_quality(&text, &engagement_context, viral_potential),
            self.collab
                .assess_quality(&text, &adaptation_context, viral_potential),
        );

        let score = composite_quality(viral_potential, engagement.value, adaptation_quality.value);
        let source = if engagement.is_fallback() || adaptation_quality.is_fallback() {
            Source::Fallback
        } else {
            Source::External
        };
        QualityAssessment::gate(score, threshold, source)
    }
}

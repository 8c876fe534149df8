//! Timeout and fallback wrapper around a [`Collaborator`].
//!
//! This is the only place that knows whether the content service answered.
//! Every method returns a value; failures are logged and replaced with the
//! deterministic fallback for that call.

use std::future::Future;
use std::time::Duration;

use vgate_core::{clamp_unit, Channel, ContentIdea};

use crate::collaborator::Collaborator;
use crate::error::CollabError;
use crate::fallback::{mock_idea, tagged_adaptation};
use crate::types::{Adaptation, Sourced};

#[derive(Debug, Clone)]
pub struct Guarded<C> {
    inner: C,
    timeout: Duration,
}

impl<C: Collaborator> Guarded<C> {
    #[must_use]
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, CollabError>
    where
        F: Future<Output = Result<T, CollabError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CollabError::Timeout(self.timeout)),
        }
    }

    /// Generate an idea, synthesizing one locally if the service fails.
    pub async fn generate_idea(&self, niche: &str, quality_bias: u32) -> Sourced<ContentIdea> {
        match self
            .bounded(self.inner.generate_idea(niche, quality_bias))
            .await
        {
            Ok(idea) => Sourced::external(idea),
            Err(e) => {
                tracing::warn!(
                    niche,
                    quality_bias,
                    kind = e.kind(),
                    error = %e,
                    "idea generation failed; synthesizing mock idea"
                );
                Sourced::fallback(mock_idea(niche, quality_bias))
            }
        }
    }

    /// Score `text`, falling back to `fallback_score` on any failure.
    pub async fn assess_quality(
        &self,
        text: &str,
        context: &str,
        fallback_score: f64,
    ) -> Sourced<f64> {
        match self.bounded(self.inner.assess_quality(text, context)).await {
            Ok(score) => Sourced::external(clamp_unit(score)),
            Err(e) => {
                tracing::warn!(
                    context,
                    kind = e.kind(),
                    error = %e,
                    "quality assessment failed; reusing viral potential"
                );
                Sourced::fallback(clamp_unit(fallback_score))
            }
        }
    }

    /// Adapt copy for `channel`, falling back to the tagged original.
    pub async fn adapt_for_channel(
        &self,
        idea: &ContentIdea,
        channel: Channel,
        quality_bias: u32,
    ) -> Sourced<Adaptation> {
        match self
            .bounded(self.inner.adapt_for_channel(idea, channel, quality_bias))
            .await
        {
            Ok(adaptation) => Sourced::external(adaptation),
            Err(e) => {
                tracing::warn!(
                    idea_id = %idea.id,
                    %channel,
                    kind = e.kind(),
                    error = %e,
                    "channel adaptation failed; reusing original copy"
                );
                Sourced::fallback(tagged_adaptation(idea, channel))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::collaborator::OfflineCollaborator;
    use crate::types::Source;

    struct SlowCollaborator;

    impl Collaborator for SlowCollaborator {
        async fn generate_idea(
            &self,
            _niche: &str,
            _quality_bias: u32,
        ) -> Result<ContentIdea, CollabError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(CollabError::Unavailable)
        }

        async fn assess_quality(&self, _text: &str, _context: &str) -> Result<f64, CollabError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(0.99)
        }

        async fn adapt_for_channel(
            &self,
            _idea: &ContentIdea,
            _channel: Channel,
            _quality_bias: u32,
        ) -> Result<Adaptation, CollabError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(CollabError::Unavailable)
        }
    }

    #[derive(Default)]
    struct CountingCollaborator {
        calls: AtomicU32,
    }

    impl Collaborator for CountingCollaborator {
        async fn generate_idea(
            &self,
            niche: &str,
            quality_bias: u32,
        ) -> Result<ContentIdea, CollabError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(mock_idea(niche, quality_bias))
        }

        async fn assess_quality(&self, _text: &str, _context: &str) -> Result<f64, CollabError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.64)
        }

        async fn adapt_for_channel(
            &self,
            idea: &ContentIdea,
            _channel: Channel,
            _quality_bias: u32,
        ) -> Result<Adaptation, CollabError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Adaptation {
                title: format!("{} (cut)", idea.title),
                description: "short".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn timeout_resolves_to_fallback_score() {
        let guarded = Guarded::new(SlowCollaborator, Duration::from_millis(20));
        let scored = guarded.assess_quality("text", "idea", 0.42).await;
        assert_eq!(scored.source, Source::Fallback);
        assert!((scored.value - 0.42).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn timeout_resolves_to_mock_idea() {
        let guarded = Guarded::new(SlowCollaborator, Duration::from_millis(20));
        let idea = guarded.generate_idea("urban cycling", 0).await;
        assert!(idea.is_fallback());
        assert_eq!(idea.value.id, mock_idea("urban cycling", 0).id);
    }

    #[tokio::test]
    async fn offline_adaptation_is_tagged_original() {
        let guarded = Guarded::new(OfflineCollaborator, Duration::from_secs(1));
        let idea = mock_idea("baking", 0);
        let adapted = guarded
            .adapt_for_channel(&idea, Channel::TikTok, 0)
            .await;
        assert!(adapted.is_fallback());
        assert_eq!(adapted.value, tagged_adaptation(&idea, Channel::TikTok));
    }

    #[tokio::test]
    async fn successful_calls_are_external() {
        let guarded = Guarded::new(CountingCollaborator::default(), Duration::from_secs(1));
        let idea = guarded.generate_idea("baking", 0).await;
        assert_eq!(idea.source, Source::External);
        let score = guarded.assess_quality("x", "idea", 0.1).await;
        assert_eq!(score.source, Source::External);
        assert!((score.value - 0.64).abs() < f64::EPSILON);
        let adapted = guarded
            .adapt_for_channel(&idea.value, Channel::YouTube, 0)
            .await;
        assert_eq!(adapted.source, Source::External);
        assert_eq!(guarded.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fallback_score_is_clamped() {
        let guarded = Guarded::new(OfflineCollaborator, Duration::from_secs(1));
        let scored = guarded.assess_quality("x", "idea", 1.3).await;
        assert!((scored.value - 1.0).abs() < f64::EPSILON);
    }
}

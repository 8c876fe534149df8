//! Scriptable collaborator for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use uuid::Uuid;
use vgate_collab::{Adaptation, CollabError, Collaborator};
use vgate_core::{Channel, ContentIdea, ContentType};

pub(crate) fn idea_with(viral_potential: f64) -> ContentIdea {
    ContentIdea {
        id: Uuid::from_u128(0x5157_a1ab_1e00),
        niche: "sustainable living".to_string(),
        title: "Zero-waste kitchen in a weekend".to_string(),
        description: "The swaps that actually stick".to_string(),
        content_type: ContentType::Video,
        viral_potential,
        keywords: vec!["zero waste".to_string()],
        estimated_revenue: 200.0,
        created_at: Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap(),
    }
}

/// Collaborator whose answers are fixed up front. `None` scores fail the call.
pub(crate) struct Scripted {
    pub idea_potential: f64,
    pub idea_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub adaptation_score: Option<f64>,
    pub fail_channels: Vec<Channel>,
    pub generate_calls: AtomicU32,
    pub assess_calls: AtomicU32,
    pub adapt_calls: AtomicU32,
    pub contexts: Mutex<Vec<String>>,
}

impl Scripted {
    pub(crate) fn new(idea_potential: f64) -> Self {
        Self {
            idea_potential,
            idea_score: Some(idea_potential),
            engagement_score: Some(0.8),
            adaptation_score: Some(0.8),
            fail_channels: Vec::new(),
            generate_calls: AtomicU32::new(0),
            assess_calls: AtomicU32::new(0),
            adapt_calls: AtomicU32::new(0),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unreachable(idea_potential: f64) -> Self {
        Self {
            idea_score: None,
            engagement_score: None,
            adaptation_score: None,
            ..Self::new(idea_potential)
        }
    }

    pub(crate) fn calls(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

impl Collaborator for Scripted {
    async fn generate_idea(
        &self,
        niche: &str,
        _quality_bias: u32,
    ) -> Result<ContentIdea, CollabError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let mut idea = idea_with(self.idea_potential);
        niche.clone_into(&mut idea.niche);
        Ok(idea)
    }

    async fn assess_quality(&self, text: &str, context: &str) -> Result<f64, CollabError> {
        self.assess_calls.fetch_add(1, Ordering::SeqCst);
        self.contexts
            .lock()
            .expect("contexts lock")
            .push(context.to_string());

        let score = if context.starts_with("engagement:") {
            self.engagement_score
        } else if context.starts_with("adaptation:") {
            self.adaptation_score
        } else {
            self.idea_score
        };

        if self
            .fail_channels
            .iter()
            .any(|c| text.contains(&format!("<{c}>")))
        {
            return Ok(0.0);
        }

        score.ok_or(CollabError::Unavailable)
    }

    async fn adapt_for_channel(
        &self,
        idea: &ContentIdea,
        channel: Channel,
        quality_bias: u32,
    ) -> Result<Adaptation, CollabError> {
        self.adapt_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Adaptation {
            title: format!("{} <{channel}> v{quality_bias}", idea.title),
            description: idea.description.clone(),
        })
    }
}

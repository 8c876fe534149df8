use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vgate_core::{Channel, ContentIdea, ContentType};

/// Channel-adapted copy returned by `adaptForChannel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adaptation {
    pub title: String,
    pub description: String,
}

/// Whether a value came from the collaborator or from a local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    External,
    Fallback,
}

/// A collaborator result paired with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub(crate) fn external(value: T) -> Self {
        Self {
            value,
            source: Source::External,
        }
    }

    pub(crate) fn fallback(value: T) -> Self {
        Self {
            value,
            source: Source::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct IdeaRequest<'a> {
    pub niche: &'a str,
    /// Number of prior rejections; non-zero asks for higher-quality output.
    pub quality_bias: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessRequest<'a> {
    pub text: &'a str,
    pub context: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdaptRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub channel: Channel,
    pub quality_bias: u32,
}

/// Wire shape of a generated idea. `id` and `created_at` are optional and
/// filled locally when the collaborator omits them.
#[derive(Debug, Deserialize)]
pub(crate) struct IdeaPayload {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub content_type: Option<ContentType>,
    pub viral_potential: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub estimated_revenue: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl IdeaPayload {
    pub(crate) fn into_idea(self, niche: &str) -> ContentIdea {
        ContentIdea {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            niche: niche.to_string(),
            title: self.title,
            description: self.description,
            content_type: self.content_type.unwrap_or(ContentType::Post),
            viral_potential: self.viral_potential,
            keywords: self.keywords,
            estimated_revenue: self.estimated_revenue.unwrap_or(0.0),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
        .normalized()
    }
}

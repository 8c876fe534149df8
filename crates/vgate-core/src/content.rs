use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Channel, CoreError};

/// Clamp a score into `[0.0, 1.0]`. `NaN` maps to `0.0`.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Article,
    Post,
    Short,
    Thread,
    Carousel,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentType::Video => "video",
            ContentType::Article => "article",
            ContentType::Post => "post",
            ContentType::Short => "short",
            ContentType::Thread => "thread",
            ContentType::Carousel => "carousel",
        };
        f.write_str(s)
    }
}

impl FromStr for ContentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "article" | "blog" => Ok(ContentType::Article),
            "post" => Ok(ContentType::Post),
            "short" | "reel" => Ok(ContentType::Short),
            "thread" => Ok(ContentType::Thread),
            "carousel" => Ok(ContentType::Carousel),
            _ => Err(CoreError::UnknownContentType(s.to_string())),
        }
    }
}

/// A content proposal produced by the generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub id: Uuid,
    pub niche: String,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    /// Likelihood of high organic reach, in `[0.0, 1.0]`.
    pub viral_potential: f64,
    pub keywords: Vec<String>,
    pub estimated_revenue: f64,
    pub created_at: DateTime<Utc>,
}

impl ContentIdea {
    /// Enforce the value invariants on an idea received from outside:
    /// viral potential clamped to the unit interval, revenue non-negative,
    /// keywords trimmed and deduplicated.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.viral_potential = clamp_unit(self.viral_potential);
        if !self.estimated_revenue.is_finite() || self.estimated_revenue < 0.0 {
            self.estimated_revenue = 0.0;
        }
        let mut keywords: Vec<String> = Vec::with_capacity(self.keywords.len());
        for keyword in self.keywords.drain(..) {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        self.keywords = keywords;
        self
    }

    /// Text handed to the assessment collaborator.
    #[must_use]
    pub fn assessment_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.description)
    }
}

/// Engagement numbers produced by the performance simulator.
///
/// These are synthetic. Measured telemetry must not reuse this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedMetrics {
    pub views: u64,
    pub engagement_rate: f64,
    pub revenue: f64,
}

/// One channel-adapted variant of an accepted idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepurposedContent {
    pub source_idea_id: Uuid,
    pub channel: Channel,
    pub title: String,
    pub description: String,
    pub viral_potential: f64,
    pub quality_score: f64,
    pub metrics: SimulatedMetrics,
    pub created_at: DateTime<Utc>,
}

/// A ledger row. Field order is the CSV column order and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub content_id: Uuid,
    pub title: String,
    pub channel: Channel,
    pub viral_potential: f64,
    pub quality_score: f64,
    pub simulated_views: u64,
    pub simulated_engagement_rate: f64,
    pub simulated_revenue: f64,
    pub created_at: DateTime<Utc>,
    pub performance_at: DateTime<Utc>,
}

impl PerformanceRecord {
    /// Snapshot a variant as observed at `performance_at`.
    #[must_use]
    pub fn from_variant(variant: &RepurposedContent, performance_at: DateTime<Utc>) -> Self {
        Self {
            content_id: variant.source_idea_id,
            title: variant.title.clone(),
            channel: variant.channel,
            viral_potential: variant.viral_potential,
            quality_score: variant.quality_score,
            simulated_views: variant.metrics.views,
            simulated_engagement_rate: variant.metrics.engagement_rate,
            simulated_revenue: variant.metrics.revenue,
            created_at: variant.created_at,
            performance_at,
        }
    }

    #[must_use]
    pub fn metrics(&self) -> SimulatedMetrics {
        SimulatedMetrics {
            views: self.simulated_views,
            engagement_rate: self.simulated_engagement_rate,
            revenue: self.simulated_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea(viral_potential: f64) -> ContentIdea {
        ContentIdea {
            id: Uuid::new_v4(),
            niche: "sustainable living".to_string(),
            title: "Zero-waste kitchen".to_string(),
            description: "Ten swaps that stick".to_string(),
            content_type: ContentType::Video,
            viral_potential,
            keywords: vec!["Zero Waste ".to_string(), "zero waste".to_string(), String::new()],
            estimated_revenue: -5.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn clamp_unit_handles_out_of_range_and_nan() {
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn normalized_clamps_and_dedups() {
        let normalized = idea(1.4).normalized();
        assert_eq!(normalized.viral_potential, 1.0);
        assert_eq!(normalized.estimated_revenue, 0.0);
        assert_eq!(normalized.keywords, vec!["zero waste".to_string()]);
    }

    #[test]
    fn content_type_parses_aliases() {
        assert_eq!("Reel".parse::<ContentType>().unwrap(), ContentType::Short);
        assert_eq!("blog".parse::<ContentType>().unwrap(), ContentType::Article);
        assert!("podcast".parse::<ContentType>().is_err());
    }

    #[test]
    fn record_snapshot_copies_variant_fields() {
        let created_at = Utc::now();
        let variant = RepurposedContent {
            source_idea_id: Uuid::new_v4(),
            channel: Channel::Instagram,
            title: "t".to_string(),
            description: "d".to_string(),
            viral_potential: 0.9,
            quality_score: 0.8,
            metrics: SimulatedMetrics {
                views: 1200,
                engagement_rate: 0.05,
                revenue: 0.6,
            },
            created_at,
        };
        let at = created_at + chrono::Duration::hours(3);
        let record = PerformanceRecord::from_variant(&variant, at);
        assert_eq!(record.content_id, variant.source_idea_id);
        assert_eq!(record.channel, Channel::Instagram);
        assert_eq!(record.metrics(), variant.metrics);
        assert_eq!(record.created_at, created_at);
        assert_eq!(record.performance_at, at);
    }
}

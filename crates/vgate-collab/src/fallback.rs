//! Deterministic stand-ins used when the content service cannot answer.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;
use vgate_core::{Channel, ContentIdea, ContentType};

use crate::types::Adaptation;

/// Viral potential assigned to a synthesized idea before any quality bias.
pub const MOCK_VIRAL_POTENTIAL: f64 = 0.75;

const MOCK_VIRAL_POTENTIAL_STEP: f64 = 0.05;
const MOCK_VIRAL_POTENTIAL_CEILING: f64 = 0.95;
const MOCK_ESTIMATED_REVENUE: f64 = 150.0;

/// Build an idea locally from the niche alone, dated today (UTC).
///
/// The id is a UUID v5 of the niche and bias, and `created_at` is midnight of
/// the current UTC day, so repeated synthesis for the same request on the
/// same day yields the same content.
#[must_use]
pub fn mock_idea(niche: &str, quality_bias: u32) -> ContentIdea {
    mock_idea_on(niche, quality_bias, Utc::now().date_naive())
}

/// [`mock_idea`] for an explicit creation day.
#[must_use]
pub fn mock_idea_on(niche: &str, quality_bias: u32, day: NaiveDate) -> ContentIdea {
    let niche = niche.trim();
    let key = format!("{}#{quality_bias}", niche.to_lowercase());
    let topic = title_case(niche);

    let viral_potential = (MOCK_VIRAL_POTENTIAL
        + MOCK_VIRAL_POTENTIAL_STEP * f64::from(quality_bias))
    .min(MOCK_VIRAL_POTENTIAL_CEILING);

    let mut keywords: Vec<String> = niche.split_whitespace().map(str::to_string).collect();
    keywords.push("tips".to_string());

    ContentIdea {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
        niche: niche.to_string(),
        title: format!("The Beginner's Guide to {topic}"),
        description: format!(
            "A practical walkthrough of {niche}: common mistakes, quick wins and where to start this week."
        ),
        content_type: ContentType::Article,
        viral_potential,
        keywords,
        estimated_revenue: MOCK_ESTIMATED_REVENUE,
        created_at: start_of_day(day),
    }
    .normalized()
}

/// The original copy, verbatim, tagged with the target channel.
#[must_use]
pub fn tagged_adaptation(idea: &ContentIdea, channel: Channel) -> Adaptation {
    Adaptation {
        title: format!("[{}] {}", channel.display_name(), idea.title),
        description: idea.description.clone(),
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

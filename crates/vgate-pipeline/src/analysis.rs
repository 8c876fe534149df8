//! Weekly ledger summary and weekly content plan.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;
use vgate_core::{Channel, NicheConfig, NichesFile, PerformanceRecord};

pub const ANALYSIS_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub rows: usize,
    pub views: u64,
    pub revenue: f64,
    pub mean_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopContent {
    pub content_id: Uuid,
    pub title: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub rows: usize,
    pub distinct_contents: usize,
    pub total_views: u64,
    pub total_revenue: f64,
    pub mean_engagement: f64,
    /// Only channels with at least one row, in [`Channel::ALL`] order.
    pub channels: Vec<ChannelSummary>,
    pub top_content: Option<TopContent>,
}

impl std::fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows over {} contents, {} views, revenue {:.2}",
            self.rows, self.distinct_contents, self.total_views, self.total_revenue
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Summarize rows whose `performance_at` falls in the seven days ending at `now`.
#[must_use]
pub fn summarize_week(records: &[PerformanceRecord], now: DateTime<Utc>) -> LedgerSummary {
    let window_start = now - Duration::days(ANALYSIS_WINDOW_DAYS);
    let in_window: Vec<&PerformanceRecord> = records
        .iter()
        .filter(|r| r.performance_at > window_start && r.performance_at <= now)
        .collect();

    let mut per_content: HashMap<Uuid, (String, f64)> = HashMap::new();
    let mut total_views = 0u64;
    let mut total_revenue = 0.0;
    let mut engagement_sum = 0.0;
    for record in &in_window {
        total_views = total_views.saturating_add(record.simulated_views);
        total_revenue += record.simulated_revenue;
        engagement_sum += record.simulated_engagement_rate;
        let entry = per_content
            .entry(record.content_id)
            .or_insert_with(|| (record.title.clone(), 0.0));
        entry.1 += record.simulated_revenue;
    }

    let channels = Channel::ALL
        .iter()
        .filter_map(|&channel| {
            let rows: Vec<_> = in_window.iter().filter(|r| r.channel == channel).collect();
            if rows.is_empty() {
                return None;
            }
            let engagement: f64 = rows.iter().map(|r| r.simulated_engagement_rate).sum();
            Some(ChannelSummary {
                channel,
                rows: rows.len(),
                views: rows
                    .iter()
                    .fold(0u64, |acc, r| acc.saturating_add(r.simulated_views)),
                revenue: rows.iter().map(|r| r.simulated_revenue).sum(),
                mean_engagement: mean(engagement, rows.len()),
            })
        })
        .collect();

    let top_content = per_content
        .iter()
        .max_by(|a, b| {
            a.1 .1
                .total_cmp(&b.1 .1)
                // Stable choice between equal revenues.
                .then_with(|| b.0.cmp(a.0))
        })
        .map(|(id, (title, revenue))| TopContent {
            content_id: *id,
            title: title.clone(),
            revenue: *revenue,
        });

    LedgerSummary {
        window_start,
        window_end: now,
        rows: in_window.len(),
        distinct_contents: per_content.len(),
        total_views,
        total_revenue,
        mean_engagement: mean(engagement_sum, in_window.len()),
        channels,
        top_content,
    }
}

/// The niche the daily generation job uses on `date` (rotation by day of year).
#[must_use]
pub fn niche_for_day(niches: &NichesFile, date: NaiveDate) -> Option<&NicheConfig> {
    niches.rotation(date.ordinal0() as usize)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedDay {
    pub date: NaiveDate,
    pub niche: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPlan {
    pub start: NaiveDate,
    pub days: Vec<PlannedDay>,
}

impl std::fmt::Display for WeeklyPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plan from {} covering {} days", self.start, self.days.len())
    }
}

/// Seven days starting at `start`, each mapped to that day's niche.
#[must_use]
pub fn plan_week(niches: &NichesFile, start: NaiveDate) -> WeeklyPlan {
    let days = start
        .iter_days()
        .take(7)
        .filter_map(|date| {
            niche_for_day(niches, date).map(|niche| PlannedDay {
                date,
                niche: niche.name.clone(),
                keywords: niche.keywords.clone(),
            })
        })
        .collect();
    WeeklyPlan { start, days }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 22, 0, 0).unwrap()
    }

    fn row(id: u128, channel: Channel, views: u64, revenue: f64, days_ago: i64) -> PerformanceRecord {
        let at = now() - Duration::days(days_ago);
        PerformanceRecord {
            content_id: Uuid::from_u128(id),
            title: format!("idea {id}"),
            channel,
            viral_potential: 0.8,
            quality_score: 0.8,
            simulated_views: views,
            simulated_engagement_rate: 0.05,
            simulated_revenue: revenue,
            created_at: at,
            performance_at: at,
        }
    }

    fn catalogue() -> NichesFile {
        NichesFile {
            niches: ["home fitness", "remote work", "budget travel"]
                .into_iter()
                .map(|name| NicheConfig {
                    name: name.to_string(),
                    keywords: vec![format!("{name} tips")],
                })
                .collect(),
        }
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        let summary = summarize_week(&[], now());
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.mean_engagement, 0.0);
        assert!(summary.channels.is_empty());
        assert!(summary.top_content.is_none());
    }

    #[test]
    fn summary_covers_only_last_seven_days() {
        let records = vec![
            row(1, Channel::YouTube, 1_000, 5.0, 1),
            row(1, Channel::TikTok, 3_000, 9.0, 2),
            row(2, Channel::YouTube, 2_000, 12.0, 3),
            row(3, Channel::LinkedIn, 9_999, 99.0, 8),
        ];
        let summary = summarize_week(&records, now());
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.distinct_contents, 2);
        assert_eq!(summary.total_views, 6_000);
        assert_eq!(summary.total_revenue, 26.0);
        assert!((summary.mean_engagement - 0.05).abs() < 1e-12);

        let youtube = &summary.channels[0];
        assert_eq!(youtube.channel, Channel::YouTube);
        assert_eq!(youtube.rows, 2);
        assert_eq!(youtube.views, 3_000);
        assert_eq!(summary.channels.len(), 2);

        let top = summary.top_content.unwrap();
        assert_eq!(top.content_id, Uuid::from_u128(1));
        assert_eq!(top.revenue, 14.0);
    }

    #[test]
    fn plan_covers_seven_days_in_rotation() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let plan = plan_week(&catalogue(), start);
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].date, start);
        assert_eq!(plan.days[6].date, NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
        for pair in plan.days.windows(2) {
            assert_ne!(pair[0].niche, pair[1].niche, "consecutive days rotate");
        }
        assert_eq!(plan.days[0].niche, plan.days[3].niche);
    }

    #[test]
    fn daily_niche_matches_plan() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let niches = catalogue();
        let plan = plan_week(&niches, start);
        let today = niche_for_day(&niches, start).unwrap();
        assert_eq!(plan.days[0].niche, today.name);
        assert_eq!(plan.days[0].keywords, today.keywords);
    }
}

//! Daily refresh of simulated performance for content created today.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vgate_core::{Channel, PerformanceRecord};

use crate::error::LedgerError;
use crate::ledger::LedgerHandle;
use crate::simulator::PerformanceSimulator;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackingReport {
    /// Distinct `(content, channel)` pairs created today.
    pub candidates: usize,
    pub refreshed: usize,
    pub skipped_below_threshold: usize,
    pub write_failures: usize,
    pub cancelled: bool,
}

impl std::fmt::Display for TrackingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} variants refreshed, {} below threshold",
            self.refreshed, self.candidates, self.skipped_below_threshold
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

/// Latest row per `(content, channel)` among rows whose content was created
/// on the same UTC day as `now`, in first-seen order.
#[must_use]
pub fn todays_variants(records: &[PerformanceRecord], now: DateTime<Utc>) -> Vec<PerformanceRecord> {
    let today = now.date_naive();
    let mut order: Vec<(Uuid, Channel)> = Vec::new();
    let mut latest: HashMap<(Uuid, Channel), &PerformanceRecord> = HashMap::new();

    for record in records.iter().filter(|r| r.created_at.date_naive() == today) {
        let key = (record.content_id, record.channel);
        match latest.get(&key) {
            Some(existing) if existing.performance_at >= record.performance_at => {}
            Some(_) => {
                latest.insert(key, record);
            }
            None => {
                order.push(key);
                latest.insert(key, record);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| latest.get(&key).map(|r| (*r).clone()))
        .collect()
}

/// Re-simulate every variant created today and append a fresh row for each.
///
/// Rows whose stored quality is below `threshold` are skipped.
///
/// # Errors
///
/// Returns [`LedgerError`] if the ledger cannot be scanned. Individual write
/// failures are counted, not returned.
pub async fn track_today(
    ledger: &LedgerHandle,
    simulator: &PerformanceSimulator,
    threshold: f64,
    now: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<TrackingReport, LedgerError> {
    let records = ledger.read_all().await?;
    let candidates = todays_variants(&records, now);
    let mut report = TrackingReport {
        candidates: candidates.len(),
        ..TrackingReport::default()
    };

    for previous in candidates {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        if previous.quality_score < threshold {
            tracing::info!(
                content_id = %previous.content_id,
                channel = %previous.channel,
                quality = previous.quality_score,
                threshold,
                "tracking: stored quality below threshold; skipping"
            );
            report.skipped_below_threshold += 1;
            continue;
        }

        let metrics = simulator.resimulate(
            previous.content_id,
            previous.channel,
            previous.viral_potential,
            previous.quality_score,
            now.date_naive(),
        );
        let refreshed = PerformanceRecord {
            simulated_views: metrics.views,
            simulated_engagement_rate: metrics.engagement_rate,
            simulated_revenue: metrics.revenue,
            performance_at: Utc::now(),
            ..previous
        };
        if ledger.append(refreshed).await {
            report.refreshed += 1;
        } else {
            report.write_failures += 1;
        }
    }

    tracing::info!(
        candidates = report.candidates,
        refreshed = report.refreshed,
        skipped = report.skipped_below_threshold,
        "tracking run finished"
    );
    Ok(report)
}

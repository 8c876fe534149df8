//! Content pipeline: quality gate, channel fan-out, performance simulation
//! and the append-only analytics ledger.
//!
//! [`Pipeline`] ties the stages together. Tracking and analysis read the
//! ledger back through the same [`LedgerHandle`] the pipeline writes through.

pub mod analysis;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod quality;
pub mod repurpose;
pub mod simulator;
pub mod tracking;

#[cfg(test)]
mod test_support;

pub use analysis::{
    niche_for_day, plan_week, summarize_week, ChannelSummary, LedgerSummary, PlannedDay,
    TopContent, WeeklyPlan,
};
pub use error::{LedgerError, PipelineError};
pub use ledger::{CsvLedger, LedgerHandle, LEDGER_COLUMNS};
pub use pipeline::{IdeaOutcome, Pipeline, PipelineSettings, RunReport};
pub use quality::{
    composite_quality, AssessmentReason, QualityAssessment, QualityAssessor, RegenerationPolicy,
};
pub use repurpose::{ChannelOutcome, RepurposingEngine};
pub use simulator::{simulate_with_draws, ChannelProfile, PerformanceSimulator, MONETIZATION_RATE};
pub use tracking::{track_today, TrackingReport};

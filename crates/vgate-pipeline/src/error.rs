use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("quality score {score} is below the persistence threshold {threshold}")]
    BelowThreshold { score: f64, threshold: f64 },

    #[error("ledger writer is no longer running")]
    Closed,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("channel count must be between 1 and {max}, got {requested}")]
    InvalidChannelCount { requested: usize, max: usize },

    #[error("niche must be non-empty")]
    EmptyNiche,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

//! Shared domain types and configuration for the vgate content gate.

pub mod app_config;
pub mod cadence;
pub mod channel;
pub mod config;
pub mod content;
pub mod niches;

use thiserror::Error;

pub use app_config::AppConfig;
pub use cadence::Cadence;
pub use channel::Channel;
pub use config::{load_app_config, load_app_config_from_env};
pub use content::{
    clamp_unit, ContentIdea, ContentType, PerformanceRecord, RepurposedContent, SimulatedMetrics,
};
pub use niches::{load_niches, NicheConfig, NichesFile};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    #[error("invalid cadence '{input}': {reason}")]
    InvalidCadence { input: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("channel set must contain at least one channel")]
    EmptyChannelSet,

    #[error("failed to read niches file {path}: {source}")]
    NichesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse niches file: {0}")]
    NichesFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

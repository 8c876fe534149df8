use std::net::SocketAddr;
use std::path::PathBuf;

use crate::{Cadence, Channel};

/// Cadence for each recurring job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub generation: Cadence,
    pub tracking: Cadence,
    pub planning: Cadence,
    pub analysis: Cadence,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub ledger_path: PathBuf,
    pub niches_path: PathBuf,
    pub collab_url: Option<String>,
    pub collab_api_key: Option<String>,
    pub collab_timeout_secs: u64,
    pub quality_threshold: f64,
    pub max_regenerations: u32,
    pub channel_regenerations: u32,
    /// Never empty; validated at load.
    pub channels: Vec<Channel>,
    pub ideas_per_run: usize,
    pub simulation_seed: Option<u64>,
    pub schedule: ScheduleConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("ledger_path", &self.ledger_path)
            .field("niches_path", &self.niches_path)
            .field("collab_url", &self.collab_url)
            .field(
                "collab_api_key",
                &self.collab_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("collab_timeout_secs", &self.collab_timeout_secs)
            .field("quality_threshold", &self.quality_threshold)
            .field("max_regenerations", &self.max_regenerations)
            .field("channel_regenerations", &self.channel_regenerations)
            .field("channels", &self.channels)
            .field("ideas_per_run", &self.ideas_per_run)
            .field("simulation_seed", &self.simulation_seed)
            .field("schedule", &self.schedule)
            .finish()
    }
}

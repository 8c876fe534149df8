use crate::app_config::{AppConfig, ScheduleConfig};
use crate::{Cadence, Channel, ConfigError};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the channel set is empty.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the channel set is empty.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_cadence = |var: &str, default: &str| -> Result<Cadence, ConfigError> {
        or_default(var, default)
            .parse::<Cadence>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let bind_addr = or_default("VGATE_BIND_ADDR", "0.0.0.0:3100")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("VGATE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("VGATE_LOG_LEVEL", "info");
    let ledger_path = PathBuf::from(or_default(
        "VGATE_LEDGER_PATH",
        "./data/performance_ledger.csv",
    ));
    let niches_path = PathBuf::from(or_default("VGATE_NICHES_PATH", "./config/niches.yaml"));

    let collab_url = optional("VGATE_COLLAB_URL");
    let collab_api_key = optional("VGATE_COLLAB_API_KEY");
    let collab_timeout_secs = parse_u64("VGATE_COLLAB_TIMEOUT_SECS", "30")?;
    if collab_timeout_secs == 0 {
        return Err(invalid(
            "VGATE_COLLAB_TIMEOUT_SECS",
            "timeout must be at least 1 second".to_string(),
        ));
    }

    let quality_threshold = parse_threshold(&or_default("VGATE_QUALITY_THRESHOLD", "0.7"))?;
    let max_regenerations = parse_u32("VGATE_MAX_REGENERATIONS", "3")?;
    let channel_regenerations = parse_u32("VGATE_CHANNEL_REGENERATIONS", "1")?;
    let channels = match lookup("VGATE_CHANNELS") {
        Ok(raw) => parse_channels(&raw)?,
        Err(_) => Channel::ALL.to_vec(),
    };

    let ideas_per_run = or_default("VGATE_IDEAS_PER_RUN", "3")
        .parse::<usize>()
        .map_err(|e| invalid("VGATE_IDEAS_PER_RUN", e.to_string()))?;
    if ideas_per_run == 0 {
        return Err(invalid(
            "VGATE_IDEAS_PER_RUN",
            "must generate at least one idea per run".to_string(),
        ));
    }

    let simulation_seed = optional("VGATE_SIMULATION_SEED")
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| invalid("VGATE_SIMULATION_SEED", e.to_string()))
        })
        .transpose()?;

    let schedule = ScheduleConfig {
        generation: parse_cadence("VGATE_GENERATION_SCHEDULE", "daily 09:00")?,
        tracking: parse_cadence("VGATE_TRACKING_SCHEDULE", "daily 21:00")?,
        planning: parse_cadence("VGATE_PLANNING_SCHEDULE", "weekly MON 07:00")?,
        analysis: parse_cadence("VGATE_ANALYSIS_SCHEDULE", "weekly SUN 22:00")?,
    };

    Ok(AppConfig {
        bind_addr,
        log_level,
        ledger_path,
        niches_path,
        collab_url,
        collab_api_key,
        collab_timeout_secs,
        quality_threshold,
        max_regenerations,
        channel_regenerations,
        channels,
        ideas_per_run,
        simulation_seed,
        schedule,
    })
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "VGATE_QUALITY_THRESHOLD".to_string(),
        reason,
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(e.to_string()))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{value} is outside [0, 1]")));
    }
    Ok(value)
}

/// Parse a comma-separated channel list, dropping duplicates but keeping order.
fn parse_channels(raw: &str) -> Result<Vec<Channel>, ConfigError> {
    let mut channels = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let channel = token
            .parse::<Channel>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "VGATE_CHANNELS".to_string(),
                reason: e.to_string(),
            })?;
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    if channels.is_empty() {
        return Err(ConfigError::EmptyChannelSet);
    }
    Ok(channels)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

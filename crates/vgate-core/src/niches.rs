use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A topic the pipeline can generate content for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicheConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NichesFile {
    pub niches: Vec<NicheConfig>,
}

impl NichesFile {
    /// Pick the niche for a rotation slot (day-of-year, plan offset, ...).
    ///
    /// Returns `None` only for an empty catalogue, which [`load_niches`] rejects.
    #[must_use]
    pub fn rotation(&self, slot: usize) -> Option<&NicheConfig> {
        if self.niches.is_empty() {
            return None;
        }
        self.niches.get(slot % self.niches.len())
    }
}

/// Load and validate the niche catalogue from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_niches(path: &Path) -> Result<NichesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::NichesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_niches(&content)
}

fn parse_niches(content: &str) -> Result<NichesFile, ConfigError> {
    let niches_file: NichesFile =
        serde_yaml::from_str(content).map_err(ConfigError::NichesFileParse)?;
    validate_niches(&niches_file)?;
    Ok(niches_file)
}

fn validate_niches(niches_file: &NichesFile) -> Result<(), ConfigError> {
    if niches_file.niches.is_empty() {
        return Err(ConfigError::Validation(
            "niche catalogue must list at least one niche".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for niche in &niches_file.niches {
        if niche.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "niche name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(niche.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate niche: '{}'",
                niche.name
            )));
        }
    }

    Ok(())
}

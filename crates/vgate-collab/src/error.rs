use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollabError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collaborator returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("collaborator call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("malformed collaborator response: {0}")]
    Malformed(String),

    #[error("collaborator not configured")]
    Unavailable,

    #[error("invalid collaborator base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl CollabError {
    /// Short label for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CollabError::Http(_) | CollabError::Status(_) | CollabError::Unavailable => {
                "service_unavailable"
            }
            CollabError::Timeout(_) => "timeout",
            CollabError::Malformed(_) => "malformed_response",
            CollabError::InvalidBaseUrl { .. } => "config",
        }
    }
}

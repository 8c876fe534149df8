//! The generation / assessment / adaptation service boundary.

use std::future::Future;

use vgate_core::{AppConfig, Channel, ContentIdea};

use crate::client::HttpCollaborator;
use crate::error::CollabError;
use crate::types::Adaptation;

/// Raw, fallible access to the external content service.
///
/// Implementations report every failure as a [`CollabError`]; recovery is
/// the job of [`crate::Guarded`].
pub trait Collaborator: Send + Sync {
    /// `generateIdea(niche)`. `quality_bias` counts earlier rejections.
    fn generate_idea(
        &self,
        niche: &str,
        quality_bias: u32,
    ) -> impl Future<Output = Result<ContentIdea, CollabError>> + Send;

    /// `assessQuality(text, context)`, returning the score in `[0, 1]`.
    fn assess_quality(
        &self,
        text: &str,
        context: &str,
    ) -> impl Future<Output = Result<f64, CollabError>> + Send;

    /// `adaptForChannel(idea, channel)`.
    fn adapt_for_channel(
        &self,
        idea: &ContentIdea,
        channel: Channel,
        quality_bias: u32,
    ) -> impl Future<Output = Result<Adaptation, CollabError>> + Send;
}

/// Collaborator used when no service URL is configured. Every call fails
/// with [`CollabError::Unavailable`], so callers always take the fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCollaborator;

impl Collaborator for OfflineCollaborator {
    async fn generate_idea(
        &self,
        _niche: &str,
        _quality_bias: u32,
    ) -> Result<ContentIdea, CollabError> {
        Err(CollabError::Unavailable)
    }

    async fn assess_quality(&self, _text: &str, _context: &str) -> Result<f64, CollabError> {
        Err(CollabError::Unavailable)
    }

    async fn adapt_for_channel(
        &self,
        _idea: &ContentIdea,
        _channel: Channel,
        _quality_bias: u32,
    ) -> Result<Adaptation, CollabError> {
        Err(CollabError::Unavailable)
    }
}

/// The collaborator selected from configuration.
#[derive(Debug, Clone)]
pub enum ServiceCollaborator {
    Http(HttpCollaborator),
    Offline(OfflineCollaborator),
}

impl ServiceCollaborator {
    /// HTTP client when `collab_url` is set, offline otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CollabError`] if the HTTP client cannot be constructed or
    /// the base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollabError> {
        match &config.collab_url {
            Some(url) => Ok(Self::Http(HttpCollaborator::with_base_url(
                url,
                config.collab_api_key.as_deref(),
                config.collab_timeout_secs,
            )?)),
            None => {
                tracing::warn!(
                    "VGATE_COLLAB_URL not set; all generation and scoring will use local fallbacks"
                );
                Ok(Self::Offline(OfflineCollaborator))
            }
        }
    }
}

impl Collaborator for ServiceCollaborator {
    async fn generate_idea(
        &self,
        niche: &str,
        quality_bias: u32,
    ) -> Result<ContentIdea, CollabError> {
        match self {
            Self::Http(c) => c.generate_idea(niche, quality_bias).await,
            Self::Offline(c) => c.generate_idea(niche, quality_bias).await,
        }
    }

    async fn assess_quality(&self, text: &str, context: &str) -> Result<f64, CollabError> {
        match self {
            Self::Http(c) => c.assess_quality(text, context).await,
            Self::Offline(c) => c.assess_quality(text, context).await,
        }
    }

    async fn adapt_for_channel(
        &self,
        idea: &ContentIdea,
        channel: Channel,
        quality_bias: u32,
    ) -> Result<Adaptation, CollabError> {
        match self {
            Self::Http(c) => c.adapt_for_channel(idea, channel, quality_bias).await,
            Self::Offline(c) => c.adapt_for_channel(idea, channel, quality_bias).await,
        }
    }
}

//! HTTP client for the content service.
//!
//! Wraps `reqwest` with bearer-key handling, base URL normalisation and
//! response validation. Every failure is surfaced as a [`CollabError`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use vgate_core::{Channel, ContentIdea};

use crate::collaborator::Collaborator;
use crate::error::CollabError;
use crate::types::{AdaptRequest, Adaptation, AssessRequest, IdeaPayload, IdeaRequest};

/// Client for the content service's `/ideas`, `/assess` and `/adapt` endpoints.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl HttpCollaborator {
    /// Creates a client for `base_url` (also used to point at wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`CollabError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CollabError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, CollabError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vgate/0.1 (content-gate)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CollabError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CollabError> {
        self.base_url
            .join(path)
            .map_err(|e| CollabError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, CollabError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollabError::Status(status));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| CollabError::Malformed(format!("{path}: body is not JSON: {e}")))
    }
}

/// Extract a `[0, 1]` score from an `assessQuality` response body.
pub(crate) fn parse_score(body: &serde_json::Value) -> Result<f64, CollabError> {
    let raw = body
        .get("score")
        .ok_or_else(|| CollabError::Malformed("missing 'score' field".to_string()))?;
    let score = raw
        .as_f64()
        .ok_or_else(|| CollabError::Malformed(format!("'score' is not numeric: {raw}")))?;
    if !(0.0..=1.0).contains(&score) {
        return Err(CollabError::Malformed(format!(
            "'score' {score} outside [0, 1]"
        )));
    }
    Ok(score)
}

impl Collaborator for HttpCollaborator {
    async fn generate_idea(
        &self,
        niche: &str,
        quality_bias: u32,
    ) -> Result<ContentIdea, CollabError> {
        let body = self
            .post_json(
                "ideas",
                &IdeaRequest {
                    niche,
                    quality_bias,
                },
            )
            .await?;
        let payload: IdeaPayload = serde_json::from_value(body)
            .map_err(|e| CollabError::Malformed(format!("ideas: {e}")))?;
        Ok(payload.into_idea(niche))
    }

    async fn assess_quality(&self, text: &str, context: &str) -> Result<f64, CollabError> {
        let body = self
            .post_json("assess", &AssessRequest { text, context })
            .await?;
        parse_score(&body)
    }

    async fn adapt_for_channel(
        &self,
        idea: &ContentIdea,
        channel: Channel,
        quality_bias: u32,
    ) -> Result<Adaptation, CollabError> {
        let body = self
            .post_json(
                "adapt",
                &AdaptRequest {
                    title: &idea.title,
                    description: &idea.description,
                    channel,
                    quality_bias,
                },
            )
            .await?;
        let adaptation: Adaptation = serde_json::from_value(body)
            .map_err(|e| CollabError::Malformed(format!("adapt: {e}")))?;
        if adaptation.title.trim().is_empty() {
            return Err(CollabError::Malformed("adapt: empty title".to_string()));
        }
        Ok(adaptation)
    }
}

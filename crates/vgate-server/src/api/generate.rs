use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use vgate_core::RepurposedContent;
use vgate_pipeline::PipelineError;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    niche: String,
    /// First N configured channels; all of them when omitted.
    channel_count: Option<usize>,
}

fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::InvalidChannelCount { .. } | PipelineError::EmptyNiche => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        PipelineError::Ledger(e) => {
            tracing::error!(error = %e, "manual generation: ledger failure");
            ApiError::new(request_id, "internal_error", "ledger unavailable")
        }
    }
}

pub(super) async fn manual_generate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<Vec<RepurposedContent>>>, ApiError> {
    let channel_count = body
        .channel_count
        .unwrap_or_else(|| state.scheduler.pipeline().settings().channels.len());

    let variants = state
        .scheduler
        .manual_generate(&body.niche, channel_count)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(variants, req_id.0))
}

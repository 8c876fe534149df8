use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use vgate_pipeline::{LedgerSummary, WeeklyPlan};

use crate::middleware::RequestId;
use crate::scheduler::{JobKind, JobResult, JobStatus};

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct JobRunItem {
    job: JobKind,
    result: JobResult,
}

#[derive(Debug, Serialize)]
pub(super) struct JobCancelItem {
    job: JobKind,
    cancelled: bool,
}

fn resolve_job(request_id: &str, raw: &str) -> Result<JobKind, ApiError> {
    JobKind::parse(raw)
        .ok_or_else(|| ApiError::new(request_id, "not_found", format!("job '{raw}' not found")))
}

pub(super) async fn scheduler_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<BTreeMap<JobKind, JobStatus>>> {
    ApiResponse::new(state.scheduler.status(), req_id.0)
}

pub(super) async fn run_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job): Path<String>,
) -> Result<Json<ApiResponse<JobRunItem>>, ApiError> {
    let job = resolve_job(&req_id.0, &job)?;
    let result = state.scheduler.run_now(job).await;
    Ok(ApiResponse::new(JobRunItem { job, result }, req_id.0))
}

pub(super) async fn cancel_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job): Path<String>,
) -> Result<Json<ApiResponse<JobCancelItem>>, ApiError> {
    let job = resolve_job(&req_id.0, &job)?;
    let cancelled = state.scheduler.cancel(job);
    Ok(ApiResponse::new(JobCancelItem { job, cancelled }, req_id.0))
}

pub(super) async fn latest_plan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<WeeklyPlan>>, ApiError> {
    let plan = state
        .scheduler
        .latest_plan()
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no weekly plan yet"))?;
    Ok(ApiResponse::new(plan, req_id.0))
}

pub(super) async fn latest_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<LedgerSummary>>, ApiError> {
    let summary = state
        .scheduler
        .latest_summary()
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no weekly analysis yet"))?;
    Ok(ApiResponse::new(summary, req_id.0))
}

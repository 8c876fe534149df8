mod generate;
mod scheduler;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vgate_collab::ServiceCollaborator;

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};
use crate::scheduler::Scheduler;

pub type ServiceScheduler = Scheduler<ServiceCollaborator>;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<ServiceScheduler>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    collaborator: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/generate", post(generate::manual_generate))
        .route(
            "/api/v1/scheduler/status",
            get(scheduler::scheduler_status),
        )
        .route("/api/v1/scheduler/{job}/run", post(scheduler::run_job))
        .route(
            "/api/v1/scheduler/{job}/cancel",
            post(scheduler::cancel_job),
        )
        .route("/api/v1/plan/latest", get(scheduler::latest_plan))
        .route("/api/v1/analysis/latest", get(scheduler::latest_summary))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let collaborator = match state.scheduler.pipeline().collaborator().inner() {
        ServiceCollaborator::Http(_) => "http",
        ServiceCollaborator::Offline(_) => "offline",
    };
    (
        StatusCode::OK,
        ApiResponse::new(
            HealthData {
                status: "ok",
                collaborator,
            },
            req_id.0,
        ),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;
    use vgate_collab::{Guarded, OfflineCollaborator};
    use vgate_core::app_config::ScheduleConfig;
    use vgate_core::{NicheConfig, NichesFile};
    use vgate_pipeline::{CsvLedger, LedgerHandle, Pipeline, PipelineSettings};

    use super::*;

    fn test_state() -> AppState {
        let path = std::env::temp_dir()
            .join(format!("vgate-api-{}", Uuid::new_v4()))
            .join("ledger.csv");
        let settings = PipelineSettings {
            seed: Some(9),
            ..PipelineSettings::default()
        };
        let ledger = LedgerHandle::spawn(CsvLedger::new(path), settings.threshold);
        let collab = Arc::new(Guarded::new(
            ServiceCollaborator::Offline(OfflineCollaborator),
            Duration::from_secs(1),
        ));
        let pipeline = Arc::new(Pipeline::new(collab, ledger, settings));
        let niches = NichesFile {
            niches: vec![NicheConfig {
                name: "plant-based cooking".to_string(),
                keywords: vec!["meal prep".to_string()],
            }],
        };
        let schedule = ScheduleConfig {
            generation: "daily 09:00".parse().expect("cadence"),
            tracking: "daily 21:00".parse().expect("cadence"),
            planning: "weekly MON 07:00".parse().expect("cadence"),
            analysis: "weekly SUN 22:00".parse().expect("cadence"),
        };
        AppState {
            scheduler: Arc::new(Scheduler::new(pipeline, niches, schedule)),
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json body");
        (status, json)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("req-2", "queue_full", "try later").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_offline_collaborator_and_echoes_request_id() {
        let app = build_app(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header(REQUEST_ID_HEADER, "req-abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).expect("header"),
            "req-abc"
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["data"]["collaborator"], "offline");
        assert_eq!(json["meta"]["request_id"], "req-abc");
    }

    #[tokio::test]
    async fn generate_returns_variants_for_first_channels() {
        let app = build_app(test_state());
        let (status, json) = send(
            app,
            post_json(
                "/api/v1/generate",
                &serde_json::json!({"niche": "plant-based cooking", "channel_count": 3}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let variants = json["data"].as_array().expect("array");
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0]["channel"], "youtube");
        assert_eq!(variants[2]["channel"], "instagram");
    }

    #[tokio::test]
    async fn generate_rejects_zero_channels() {
        let app = build_app(test_state());
        let (status, json) = send(
            app,
            post_json(
                "/api/v1/generate",
                &serde_json::json!({"niche": "plant-based cooking", "channel_count": 0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn status_lists_all_jobs() {
        let app = build_app(test_state());
        let (status, json) = send(app, get_req("/api/v1/scheduler/status")).await;
        assert_eq!(status, StatusCode::OK);
        for job in [
            "daily_generation",
            "daily_tracking",
            "weekly_planning",
            "weekly_analysis",
        ] {
            assert_eq!(json["data"][job]["state"], "idle", "{job}");
            assert!(json["data"][job]["next_run"].is_string());
        }
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let app = build_app(test_state());
        let (status, json) = send(
            app,
            post_json("/api/v1/scheduler/hourly_cleanup/run", &serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn running_planning_publishes_latest_plan() {
        let state = test_state();

        let (status, _) = send(build_app(state.clone()), get_req("/api/v1/plan/latest")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = send(
            build_app(state.clone()),
            post_json("/api/v1/scheduler/weekly-planning/run", &serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["job"], "weekly_planning");
        assert_eq!(json["data"]["result"]["status"], "completed");

        let (status, json) = send(build_app(state), get_req("/api/v1/plan/latest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["days"].as_array().expect("days").len(), 7);
        assert_eq!(json["data"]["days"][0]["niche"], "plant-based cooking");
    }
}

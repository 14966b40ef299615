mod app;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storelytics_analysis::{PipelineError, ReviewPipeline};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReviewPipeline>,
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
}

#[derive(Debug, Serialize)]
struct IndexData {
    message: &'static str,
    version: &'static str,
    endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
struct Endpoints {
    health: &'static str,
    app_info: &'static str,
    app_reviews: &'static str,
    collect_and_preprocess: &'static str,
    analyze: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
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
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Converts a pipeline failure into the error envelope.
///
/// Internal failures are logged and reported without their detail.
pub(super) fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::Internal(_) => {
            tracing::error!(request_id = %request_id, error = %error, "pipeline failed");
            ApiError::new(request_id, error.code(), "internal server error")
        }
        PipelineError::Upstream(_) => {
            tracing::warn!(request_id = %request_id, error = %error, "catalog unavailable");
            ApiError::new(request_id, error.code(), error.to_string())
        }
        PipelineError::NotFound(_) | PipelineError::Validation(_) => {
            ApiError::new(request_id, error.code(), error.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/app/health", get(health))
        .route("/app/{app_id}/info", get(app::get_app_info))
        .route("/app/{app_id}/reviews", get(app::get_app_reviews))
        .route(
            "/app/collect-and-preprocess",
            post(app::collect_and_preprocess),
        )
        .route("/app/analyze", post(app::analyze))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn index() -> Json<IndexData> {
    Json(IndexData {
        message: "storelytics review analytics API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/app/health",
            app_info: "/app/{app_id}/info",
            app_reviews: "/app/{app_id}/reviews",
            collect_and_preprocess: "/app/collect-and-preprocess",
            analyze: "/app/analyze",
        },
    })
}

async fn health() -> Json<HealthData> {
    Json(HealthData { status: "healthy" })
}

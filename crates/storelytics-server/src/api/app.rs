//! Handlers for the `/app` routes.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use storelytics_analysis::{AnalyzeReport, AnalyzeRequest, CollectReport, CollectRequest};
use storelytics_core::{AppDetails, RawReview};

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CountryQuery {
    country: Option<String>,
}

impl CountryQuery {
    fn country(&self) -> &str {
        self.country.as_deref().unwrap_or("us")
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AppInfoResponse {
    status: &'static str,
    details: AppDetails,
}

#[derive(Debug, Serialize)]
pub(super) struct AppReviewsResponse {
    status: &'static str,
    count: usize,
    items: Vec<RawReview>,
}

pub(super) async fn get_app_info(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(app_id): Path<String>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<AppInfoResponse>, ApiError> {
    let details = state
        .pipeline
        .app_info(&app_id, query.country())
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(AppInfoResponse {
        status: "success",
        details,
    }))
}

pub(super) async fn get_app_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(app_id): Path<String>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<AppReviewsResponse>, ApiError> {
    let items = state
        .pipeline
        .recent_reviews(&app_id, query.country())
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(AppReviewsResponse {
        status: "success",
        count: items.len(),
        items,
    }))
}

pub(super) async fn collect_and_preprocess(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CollectRequest>,
) -> Result<Json<CollectReport>, ApiError> {
    state
        .pipeline
        .collect_and_preprocess(&body)
        .await
        .map(Json)
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeReport>, ApiError> {
    state
        .pipeline
        .analyze(&body)
        .await
        .map(Json)
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))
}

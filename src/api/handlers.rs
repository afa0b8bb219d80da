use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Form, Json,
};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{
        HealthResponse, RecommendationRequest, RecommendationResponse, ReloadResponse,
        ServiceStatus,
    },
};

use super::AppState;

/// Health check endpoint; 503 until artifacts are loaded
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.recommender.snapshot().await {
        Some(artifacts) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: ServiceStatus::Healthy,
                catalog_size: Some(artifacts.catalog().len()),
                loaded_at: Some(artifacts.loaded_at()),
            }),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: ServiceStatus::Loading,
                catalog_size: None,
                loaded_at: None,
            }),
        ),
    }
}

/// Recommendations for a form-encoded `title`
pub async fn recommend_form(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Form(request): Form<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    recommend(&state, &request_id, request).await
}

/// Recommendations for a `?title=` query
pub async fn recommend_query(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(request): Query<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    recommend(&state, &request_id, request).await
}

async fn recommend(
    state: &AppState,
    request_id: &RequestId,
    request: RecommendationRequest,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        "Processing recommendation request"
    );

    let response = state
        .recommender
        .recommend_or_placeholder(&request.title)
        .await?;

    Ok(Json(response))
}

/// Reloads artifacts from the configured source and swaps them in
pub async fn reload(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ReloadResponse>> {
    tracing::info!(request_id = %request_id, "Reloading artifacts");

    let artifacts = state
        .recommender
        .load(state.source.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Reload failed; keeping current artifacts");
            e
        })?;

    Ok(Json(ReloadResponse {
        status: "reloaded".to_string(),
        catalog_size: artifacts.catalog().len(),
    }))
}

//! Training request intake and lookup endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::{CreateTrainingRequest, RequestStatus, TrainingRequest},
};

/// Query parameters for the request listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct RequestListQuery {
    /// Filter by lifecycle status (e.g. "tentative", "confirmed")
    pub status: Option<String>,
}

/// Submit a new training request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = CreateTrainingRequest,
    responses(
        (status = 201, description = "Request created with quotation and reference code", body = TrainingRequest),
        (status = 400, description = "Invalid intake payload")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateTrainingRequest>,
) -> AppResult<(StatusCode, Json<TrainingRequest>)> {
    let request = state.services.requests.create(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List training requests, optionally filtered by status
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Training requests", body = Vec<TrainingRequest>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<Vec<TrainingRequest>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<RequestStatus>().map_err(AppError::Validation))
        .transpose()?;

    let requests = state.services.requests.list(status).await?;
    Ok(Json(requests))
}

/// Get a training request by reference code
#[utoipa::path(
    get,
    path = "/requests/{reference}",
    tag = "requests",
    params(
        ("reference" = String, Path, description = "Request reference code")
    ),
    responses(
        (status = 200, description = "Training request", body = TrainingRequest),
        (status = 404, description = "Unknown reference code")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<TrainingRequest>> {
    let request = state.services.requests.get(&reference).await?;
    Ok(Json(request))
}

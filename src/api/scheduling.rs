//! Availability, suggestion and date-selection endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{AvailabilityReport, SlotConflict, TrainingRequest},
};

use super::parse_date;

/// Query parameters for a request-scoped availability check
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Desired start date (YYYY-MM-DD)
    pub start_date: String,
}

/// Query parameters for a raw technician availability check
#[derive(Debug, Deserialize, IntoParams)]
pub struct TechnicianAvailabilityQuery {
    pub technician: String,
    /// Start date (YYYY-MM-DD)
    pub start_date: String,
    /// Number of consecutive days
    pub days: i32,
}

/// Query parameters for alternative-date suggestions
#[derive(Debug, Deserialize, IntoParams)]
pub struct SuggestionQuery {
    /// The rejected start date (YYYY-MM-DD); suggestions begin after it
    pub start_date: String,
    /// Maximum number of suggestions (defaults from configuration)
    pub max: Option<usize>,
    /// Search horizon in days (defaults from configuration)
    pub horizon_days: Option<u32>,
}

/// Date selection payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectDatesRequest {
    /// Start date (YYYY-MM-DD)
    pub start_date: String,
    /// End date (YYYY-MM-DD); the range length must match the request's
    /// training days
    pub end_date: String,
}

/// Outcome of a date selection: either scheduled, or the conflicts plus
/// alternative start dates in the same response
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectDatesResponse {
    /// "scheduled" or "conflict"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<TrainingRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<SlotConflict>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<NaiveDate>,
}

/// Rejection payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

/// Check availability for a request's technician and day count
#[utoipa::path(
    get,
    path = "/requests/{reference}/availability",
    tag = "scheduling",
    params(
        ("reference" = String, Path, description = "Request reference code"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Availability report", body = AvailabilityReport),
        (status = 404, description = "Unknown reference code"),
        (status = 503, description = "Calendar backend unavailable")
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    Path(reference): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityReport>> {
    let start = parse_date("start_date", &query.start_date)?;
    let request = state.services.requests.get(&reference).await?;

    let report = state
        .services
        .availability
        .check(
            &request.assigned_technician,
            start,
            i32::from(request.training_days),
            Some(&reference),
        )
        .await?;
    Ok(Json(report))
}

/// Check raw availability for a technician and arbitrary range
#[utoipa::path(
    get,
    path = "/availability",
    tag = "scheduling",
    params(TechnicianAvailabilityQuery),
    responses(
        (status = 200, description = "Availability report", body = AvailabilityReport),
        (status = 400, description = "Invalid parameters"),
        (status = 503, description = "Calendar backend unavailable")
    )
)]
pub async fn check_technician_availability(
    State(state): State<crate::AppState>,
    Query(query): Query<TechnicianAvailabilityQuery>,
) -> AppResult<Json<AvailabilityReport>> {
    let start = parse_date("start_date", &query.start_date)?;
    let report = state
        .services
        .availability
        .check(&query.technician, start, query.days, None)
        .await?;
    Ok(Json(report))
}

/// Suggest alternative start dates after a conflict
#[utoipa::path(
    get,
    path = "/requests/{reference}/suggestions",
    tag = "scheduling",
    params(
        ("reference" = String, Path, description = "Request reference code"),
        SuggestionQuery
    ),
    responses(
        (status = 200, description = "Alternative start dates, earliest first", body = Vec<NaiveDate>),
        (status = 404, description = "Unknown reference code"),
        (status = 503, description = "Calendar backend unavailable")
    )
)]
pub async fn suggest_alternatives(
    State(state): State<crate::AppState>,
    Path(reference): Path<String>,
    Query(query): Query<SuggestionQuery>,
) -> AppResult<Json<Vec<NaiveDate>>> {
    let start = parse_date("start_date", &query.start_date)?;
    let request = state.services.requests.get(&reference).await?;
    let scheduling = &state.config.scheduling;

    let suggestions = state
        .services
        .suggestions
        .suggest(
            &request.assigned_technician,
            start,
            i32::from(request.training_days),
            query.max.unwrap_or(scheduling.suggestion_max),
            query.horizon_days.unwrap_or(scheduling.suggestion_horizon_days),
            Some(&reference),
        )
        .await?;
    Ok(Json(suggestions))
}

/// Select training dates, booking them tentatively in the team calendar.
/// On conflict the response carries the blocking days and alternative start
/// dates so the client can pick again in the same interaction.
#[utoipa::path(
    post,
    path = "/requests/{reference}/dates",
    tag = "scheduling",
    params(
        ("reference" = String, Path, description = "Request reference code")
    ),
    request_body = SelectDatesRequest,
    responses(
        (status = 200, description = "Dates booked tentatively, pending confirmation", body = SelectDatesResponse),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Unknown reference code"),
        (status = 409, description = "Requested dates conflict", body = SelectDatesResponse),
        (status = 502, description = "Tentative booking failed"),
        (status = 503, description = "Calendar backend unavailable")
    )
)]
pub async fn select_dates(
    State(state): State<crate::AppState>,
    Path(reference): Path<String>,
    Json(payload): Json<SelectDatesRequest>,
) -> AppResult<(StatusCode, Json<SelectDatesResponse>)> {
    let start = parse_date("start_date", &payload.start_date)?;
    let end = parse_date("end_date", &payload.end_date)?;

    match state
        .services
        .scheduling
        .select_dates(&reference, start, end)
        .await
    {
        Ok(request) => Ok((
            StatusCode::OK,
            Json(SelectDatesResponse {
                status: "scheduled".to_string(),
                request: Some(request),
                conflicts: Vec::new(),
                alternatives: Vec::new(),
            }),
        )),
        Err(AppError::DatesConflict(conflicts)) => {
            let request = state.services.requests.get(&reference).await?;
            let scheduling = &state.config.scheduling;
            let alternatives = state
                .services
                .suggestions
                .suggest(
                    &request.assigned_technician,
                    start,
                    i32::from(request.training_days),
                    scheduling.suggestion_max,
                    scheduling.suggestion_horizon_days,
                    Some(&reference),
                )
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(reference = %reference, error = %e, "Suggestion lookup failed");
                    Vec::new()
                });

            Ok((
                StatusCode::CONFLICT,
                Json(SelectDatesResponse {
                    status: "conflict".to_string(),
                    request: None,
                    conflicts,
                    alternatives,
                }),
            ))
        }
        Err(e) => Err(e),
    }
}

/// Reject a training request
#[utoipa::path(
    post,
    path = "/requests/{reference}/reject",
    tag = "scheduling",
    params(
        ("reference" = String, Path, description = "Request reference code")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = TrainingRequest),
        (status = 404, description = "Unknown reference code"),
        (status = 422, description = "Request is in a terminal state")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    Path(reference): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<TrainingRequest>> {
    let request = state
        .services
        .scheduling
        .reject(&reference, &payload.reason)
        .await?;
    Ok(Json(request))
}

/// Mark a confirmed training as completed
#[utoipa::path(
    post,
    path = "/requests/{reference}/complete",
    tag = "scheduling",
    params(
        ("reference" = String, Path, description = "Request reference code")
    ),
    responses(
        (status = 200, description = "Request completed", body = TrainingRequest),
        (status = 404, description = "Unknown reference code"),
        (status = 422, description = "Request is not confirmed")
    )
)]
pub async fn complete_request(
    State(state): State<crate::AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<TrainingRequest>> {
    let request = state.services.scheduling.complete(&reference).await?;
    Ok(Json(request))
}

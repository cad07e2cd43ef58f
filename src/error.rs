//! Error types for the Spindle server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::calendar::SlotConflict;

/// Application error codes returned in JSON error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    BadValue = 2,
    DbFailure = 3,
    NoSuchRequest = 4,
    DatesConflict = 5,
    BackendUnavailable = 6,
    SchedulingFailed = 7,
    TransitionRefused = 8,
    Duplicate = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Requested dates are not available ({} conflicting day(s))", .0.len())]
    DatesConflict(Vec<SlotConflict>),

    #[error("Calendar backend unavailable: {0}")]
    UnavailableBackend(String),

    #[error("Scheduling failed: {0}")]
    SchedulingFailed(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Conflicting calendar days, present for date-conflict errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<SlotConflict>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut conflicts = None;

        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchRequest, msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg),
            AppError::DatesConflict(list) => {
                let message = format!("{} conflicting day(s) in requested range", list.len());
                conflicts = Some(list);
                (StatusCode::CONFLICT, ErrorCode::DatesConflict, message)
            }
            AppError::UnavailableBackend(msg) => {
                tracing::warn!("Calendar backend unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::BackendUnavailable, msg)
            }
            AppError::SchedulingFailed(msg) => {
                tracing::error!("Scheduling failed: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorCode::SchedulingFailed, msg)
            }
            AppError::InvalidTransition(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::TransitionRefused, msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            conflicts,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

//! API handlers for Spindle REST endpoints

pub mod health;
pub mod openapi;
pub mod requests;
pub mod scheduling;

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};

/// Parse a YYYY-MM-DD query or body field
pub(crate) fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field)))
}

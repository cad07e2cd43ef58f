//! Training request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{CalendarStatus, RequestStatus};
use super::quote::Quotation;

/// Training request row from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TrainingRequest {
    pub id: i32,
    /// External-facing unique reference, e.g. "TR-000042"
    pub reference_code: String,
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    /// Two-letter US state code
    pub state: String,
    pub machine_model: Option<String>,
    pub training_days: i16,
    pub training_price: Decimal,
    pub travel_cost: Decimal,
    pub total_price: Decimal,
    /// Assigned once at creation, never reassigned
    pub assigned_technician: String,
    pub requested_start_date: Option<NaiveDate>,
    pub requested_end_date: Option<NaiveDate>,
    pub confirmed_start_date: Option<NaiveDate>,
    pub confirmed_end_date: Option<NaiveDate>,
    pub calendar_status: i16,
    pub calendar_event_ref: Option<String>,
    pub status: i16,
    pub rejection_reason: Option<String>,
    pub confirmation_notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingRequest {
    pub fn status(&self) -> RequestStatus {
        RequestStatus::from(self.status)
    }

    pub fn calendar_status(&self) -> CalendarStatus {
        CalendarStatus::from(self.calendar_status)
    }
}

/// Intake payload submitted by the web form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTrainingRequest {
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    /// Two-letter US state code, drives technician assignment and travel cost
    #[validate(length(equal = 2))]
    pub state: String,
    pub machine_model: Option<String>,
    /// Number of on-site training days
    #[validate(range(min = 1, max = 30))]
    pub training_days: i16,
}

/// Fully-resolved request ready to persist: intake fields plus the
/// technician and quotation computed by the intake service
#[derive(Debug, Clone)]
pub struct NewTrainingRequest {
    pub intake: CreateTrainingRequest,
    pub assigned_technician: String,
    pub quotation: Quotation,
}

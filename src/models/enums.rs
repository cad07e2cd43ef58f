//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a training request (stored in training_requests.status)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum RequestStatus {
    Pending = 0,
    DatesSelected = 1,
    Tentative = 2,
    Confirmed = 3,
    Rejected = 4,
    Completed = 5,
}

impl From<i16> for RequestStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => RequestStatus::DatesSelected,
            2 => RequestStatus::Tentative,
            3 => RequestStatus::Confirmed,
            4 => RequestStatus::Rejected,
            5 => RequestStatus::Completed,
            _ => RequestStatus::Pending,
        }
    }
}

impl From<RequestStatus> for i16 {
    fn from(s: RequestStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::DatesSelected => "dates_selected",
            RequestStatus::Tentative => "tentative",
            RequestStatus::Confirmed => "confirmed",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "dates_selected" => Ok(RequestStatus::DatesSelected),
            "tentative" => Ok(RequestStatus::Tentative),
            "confirmed" => Ok(RequestStatus::Confirmed),
            "rejected" => Ok(RequestStatus::Rejected),
            "completed" => Ok(RequestStatus::Completed),
            other => Err(format!("unknown request status '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// CalendarStatus
// ---------------------------------------------------------------------------

/// What the external calendar currently says about a request's booking
/// (stored in training_requests.calendar_status)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum CalendarStatus {
    None = 0,
    Pending = 1,
    Confirmed = 2,
}

impl From<i16> for CalendarStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => CalendarStatus::Pending,
            2 => CalendarStatus::Confirmed,
            _ => CalendarStatus::None,
        }
    }
}

impl From<CalendarStatus> for i16 {
    fn from(s: CalendarStatus) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// SlotState
// ---------------------------------------------------------------------------

/// Status of a single (technician, date) cell in the external calendar.
/// Serialized as lowercase strings on the sheet-service wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Free,
    Tentative,
    Confirmed,
    Blocked,
}

impl std::fmt::Display for SlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SlotState::Free => "free",
            SlotState::Tentative => "tentative",
            SlotState::Confirmed => "confirmed",
            SlotState::Blocked => "blocked",
        };
        write!(f, "{}", label)
    }
}

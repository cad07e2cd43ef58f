//! Adapter for the shared team calendar (spreadsheet-backed sheet service)
//!
//! The external calendar is the source of truth for scheduling conflicts.
//! Everything here is a thin read/write contract over it: no caching, no
//! transactions. Humans edit the same sheet, so callers must re-read before
//! every decision.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::CalendarConfig,
    error::AppError,
    models::{DaySlot, SlotState},
};

/// Errors surfaced by the calendar adapter
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar backend unreachable: {0}")]
    Unavailable(String),

    /// The date exists but is outside the range the sheet tracks. Distinct
    /// from a free slot.
    #[error("date {0} is outside the tracked calendar horizon")]
    SlotNotFound(NaiveDate),

    /// A multi-day tentative write stopped partway. `written` lists the
    /// dates that did land; the caller owns the compensation.
    #[error("tentative write stopped after {}/{requested} day(s): {message}", written.len())]
    PartialWrite {
        written: Vec<NaiveDate>,
        requested: usize,
        message: String,
    },
}

impl From<CalendarError> for AppError {
    fn from(e: CalendarError) -> Self {
        match e {
            CalendarError::Unavailable(msg) => AppError::UnavailableBackend(msg),
            CalendarError::SlotNotFound(date) => AppError::Validation(format!(
                "date {} is outside the tracked calendar horizon",
                date
            )),
            e @ CalendarError::PartialWrite { .. } => AppError::SchedulingFailed(e.to_string()),
        }
    }
}

/// Narrow contract over the external calendar store. Any tabular or
/// key-value backend that can answer these four questions is substitutable.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Read the status of a single (technician, date) cell
    async fn read_slot(&self, technician: &str, date: NaiveDate)
        -> Result<DaySlot, CalendarError>;

    /// Read every date in [start, end], one entry per calendar date in
    /// order, `free` for dates with no tracked entry
    async fn list_slots(
        &self,
        technician: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DaySlot>, CalendarError>;

    /// Write `days` consecutive tentative slots starting at `start`, each
    /// tagged with `label`. Not transactional: a mid-write failure reports
    /// [`CalendarError::PartialWrite`] and leaves the written slots behind.
    async fn write_tentative(
        &self,
        technician: &str,
        start: NaiveDate,
        days: u32,
        label: &str,
    ) -> Result<(), CalendarError>;

    /// Reset the given slots to free. Used for compensation and rejection.
    async fn clear_slots(&self, technician: &str, dates: &[NaiveDate])
        -> Result<(), CalendarError>;
}

/// The consecutive dates spanned by a booking of `days` days
pub fn booking_dates(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days))
        .map(|offset| start + chrono::Duration::days(offset))
        .collect()
}

// ---------------------------------------------------------------------------
// HTTP sheet service backend
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SlotWrite<'a> {
    state: SlotState,
    owner: Option<&'a str>,
}

/// Production adapter talking JSON to the sheet service that fronts the
/// shared team-calendar spreadsheet
pub struct HttpCalendarStore {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpCalendarStore {
    pub fn new(config: &CalendarConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn slot_url(&self, technician: &str, date: NaiveDate) -> String {
        format!("{}/calendars/{}/slots/{}", self.base_url, technician, date)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn put_slot(
        &self,
        technician: &str,
        date: NaiveDate,
        state: SlotState,
        owner: Option<&str>,
    ) -> Result<(), CalendarError> {
        let response = self
            .with_auth(self.client.put(self.slot_url(technician, date)))
            .json(&SlotWrite { state, owner })
            .send()
            .await
            .map_err(|e| CalendarError::Unavailable(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(CalendarError::SlotNotFound(date)),
            s => Err(CalendarError::Unavailable(format!(
                "sheet service returned {} writing slot {}",
                s, date
            ))),
        }
    }
}

#[async_trait]
impl CalendarStore for HttpCalendarStore {
    async fn read_slot(
        &self,
        technician: &str,
        date: NaiveDate,
    ) -> Result<DaySlot, CalendarError> {
        let response = self
            .with_auth(self.client.get(self.slot_url(technician, date)))
            .send()
            .await
            .map_err(|e| CalendarError::Unavailable(e.to_string()))?;

        match response.status() {
            s if s.is_success() => response
                .json::<DaySlot>()
                .await
                .map_err(|e| CalendarError::Unavailable(format!("malformed slot payload: {}", e))),
            reqwest::StatusCode::NOT_FOUND => Err(CalendarError::SlotNotFound(date)),
            s => Err(CalendarError::Unavailable(format!(
                "sheet service returned {} reading slot {}",
                s, date
            ))),
        }
    }

    async fn list_slots(
        &self,
        technician: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DaySlot>, CalendarError> {
        let url = format!("{}/calendars/{}/slots", self.base_url, technician);
        let response = self
            .with_auth(self.client.get(url).query(&[
                ("start", start.to_string()),
                ("end", end.to_string()),
            ]))
            .send()
            .await
            .map_err(|e| CalendarError::Unavailable(e.to_string()))?;

        let tracked: Vec<DaySlot> = match response.status() {
            s if s.is_success() => response
                .json()
                .await
                .map_err(|e| CalendarError::Unavailable(format!("malformed slot payload: {}", e)))?,
            reqwest::StatusCode::NOT_FOUND => return Err(CalendarError::SlotNotFound(start)),
            s => {
                return Err(CalendarError::Unavailable(format!(
                    "sheet service returned {} listing slots",
                    s
                )))
            }
        };

        // The sheet omits untracked dates; normalize to one entry per day.
        let by_date: HashMap<NaiveDate, DaySlot> =
            tracked.into_iter().map(|s| (s.date, s)).collect();
        let mut slots = Vec::new();
        let mut date = start;
        while date <= end {
            slots.push(
                by_date
                    .get(&date)
                    .cloned()
                    .unwrap_or_else(|| DaySlot::free(date)),
            );
            date += chrono::Duration::days(1);
        }
        Ok(slots)
    }

    async fn write_tentative(
        &self,
        technician: &str,
        start: NaiveDate,
        days: u32,
        label: &str,
    ) -> Result<(), CalendarError> {
        let dates = booking_dates(start, days);
        let mut written = Vec::new();

        for date in &dates {
            match self
                .put_slot(technician, *date, SlotState::Tentative, Some(label))
                .await
            {
                Ok(()) => written.push(*date),
                Err(e) if written.is_empty() => return Err(e),
                Err(e) => {
                    return Err(CalendarError::PartialWrite {
                        written,
                        requested: dates.len(),
                        message: e.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    async fn clear_slots(
        &self,
        technician: &str,
        dates: &[NaiveDate],
    ) -> Result<(), CalendarError> {
        for date in dates {
            self.put_slot(technician, *date, SlotState::Free, None)
                .await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// In-process calendar used by unit tests and `calendar.backend = "memory"`
/// development runs. Dates past `horizon_end` behave like untracked sheet
/// columns and fail with [`CalendarError::SlotNotFound`].
#[derive(Default)]
pub struct InMemoryCalendarStore {
    slots: Mutex<HashMap<(String, NaiveDate), DaySlot>>,
    horizon_end: Option<NaiveDate>,
}

impl InMemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizon_end(horizon_end: NaiveDate) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            horizon_end: Some(horizon_end),
        }
    }

    pub fn set_slot(
        &self,
        technician: &str,
        date: NaiveDate,
        state: SlotState,
        owner: Option<&str>,
    ) {
        self.slots.lock().unwrap().insert(
            (technician.to_string(), date),
            DaySlot {
                date,
                state,
                owner: owner.map(str::to_string),
            },
        );
    }

    fn check_horizon(&self, date: NaiveDate) -> Result<(), CalendarError> {
        match self.horizon_end {
            Some(end) if date > end => Err(CalendarError::SlotNotFound(date)),
            _ => Ok(()),
        }
    }

    fn slot(&self, technician: &str, date: NaiveDate) -> DaySlot {
        self.slots
            .lock()
            .unwrap()
            .get(&(technician.to_string(), date))
            .cloned()
            .unwrap_or_else(|| DaySlot::free(date))
    }
}

#[async_trait]
impl CalendarStore for InMemoryCalendarStore {
    async fn read_slot(
        &self,
        technician: &str,
        date: NaiveDate,
    ) -> Result<DaySlot, CalendarError> {
        self.check_horizon(date)?;
        Ok(self.slot(technician, date))
    }

    async fn list_slots(
        &self,
        technician: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DaySlot>, CalendarError> {
        self.check_horizon(end)?;
        let mut slots = Vec::new();
        let mut date = start;
        while date <= end {
            slots.push(self.slot(technician, date));
            date += chrono::Duration::days(1);
        }
        Ok(slots)
    }

    async fn write_tentative(
        &self,
        technician: &str,
        start: NaiveDate,
        days: u32,
        label: &str,
    ) -> Result<(), CalendarError> {
        let dates = booking_dates(start, days);
        let mut written = Vec::new();

        for date in &dates {
            if let Err(e) = self.check_horizon(*date) {
                if written.is_empty() {
                    return Err(e);
                }
                return Err(CalendarError::PartialWrite {
                    written,
                    requested: dates.len(),
                    message: e.to_string(),
                });
            }
            self.set_slot(technician, *date, SlotState::Tentative, Some(label));
            written.push(*date);
        }
        Ok(())
    }

    async fn clear_slots(
        &self,
        technician: &str,
        dates: &[NaiveDate],
    ) -> Result<(), CalendarError> {
        let mut slots = self.slots.lock().unwrap();
        for date in dates {
            slots.remove(&(technician.to_string(), *date));
        }
        Ok(())
    }
}

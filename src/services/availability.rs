//! Date-range availability checks against the team calendar

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{AvailabilityReport, DaySlot, SlotConflict, SlotState},
    services::calendar::CalendarStore,
};

/// Classify the slots of a range, keeping conflicts in calendar order. A
/// tentative slot owned by `own_label` is the caller's own earlier write and
/// does not count as a conflict.
pub(crate) fn conflicts_in(slots: &[DaySlot], own_label: Option<&str>) -> Vec<SlotConflict> {
    slots
        .iter()
        .filter(|slot| match slot.state {
            SlotState::Free => false,
            SlotState::Confirmed | SlotState::Blocked => true,
            SlotState::Tentative => match (&slot.owner, own_label) {
                (Some(owner), Some(own)) => owner != own,
                _ => true,
            },
        })
        .map(SlotConflict::from_slot)
        .collect()
}

#[derive(Clone)]
pub struct AvailabilityService {
    calendar: Arc<dyn CalendarStore>,
}

impl AvailabilityService {
    pub fn new(calendar: Arc<dyn CalendarStore>) -> Self {
        Self { calendar }
    }

    /// Check whether `days` consecutive days starting at `start` are free
    /// for the technician. Always re-reads the calendar; never cached.
    ///
    /// `own_label` identifies the requesting booking so its own tentative
    /// slots survive a re-check, which happens on retries.
    pub async fn check(
        &self,
        technician: &str,
        start: NaiveDate,
        days: i32,
        own_label: Option<&str>,
    ) -> AppResult<AvailabilityReport> {
        if days <= 0 {
            return Err(AppError::Validation(format!(
                "training day count must be positive, got {}",
                days
            )));
        }

        let end = start + chrono::Duration::days(i64::from(days) - 1);
        let slots = self.calendar.list_slots(technician, start, end).await?;
        let conflicts = conflicts_in(&slots, own_label);

        Ok(AvailabilityReport {
            available: conflicts.is_empty(),
            conflicts,
        })
    }
}

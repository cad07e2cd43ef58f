//! Alternative start-date suggestions after a rejected range

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    services::{
        availability::conflicts_in,
        calendar::{CalendarError, CalendarStore},
    },
};

#[derive(Clone)]
pub struct SuggestionService {
    calendar: Arc<dyn CalendarStore>,
}

impl SuggestionService {
    pub fn new(calendar: Arc<dyn CalendarStore>) -> Self {
        Self { calendar }
    }

    /// Scan forward from the day after `requested_start` for the next start
    /// dates whose `days`-day window is fully free, earliest first. Stops
    /// after `max_suggestions` hits or `horizon_days` candidates; a short or
    /// empty result is not an error. Recomputed from a fresh calendar read
    /// on every call.
    pub async fn suggest(
        &self,
        technician: &str,
        requested_start: NaiveDate,
        days: i32,
        max_suggestions: usize,
        horizon_days: u32,
        own_label: Option<&str>,
    ) -> AppResult<Vec<NaiveDate>> {
        if days <= 0 {
            return Err(AppError::Validation(format!(
                "training day count must be positive, got {}",
                days
            )));
        }
        if max_suggestions == 0 || horizon_days == 0 {
            return Ok(Vec::new());
        }

        let scan_start = requested_start + Duration::days(1);
        let window_end =
            scan_start + Duration::days(i64::from(horizon_days) - 1 + i64::from(days) - 1);

        match self.calendar.list_slots(technician, scan_start, window_end).await {
            Ok(slots) => Ok(Self::scan(
                &slots,
                scan_start,
                days as usize,
                max_suggestions,
                horizon_days,
                own_label,
            )),
            // The sheet tracks fewer days than the search horizon: fall back
            // to candidate-by-candidate reads and stop where the sheet ends.
            Err(CalendarError::SlotNotFound(_)) => {
                self.scan_clipped(
                    technician,
                    scan_start,
                    days,
                    max_suggestions,
                    horizon_days,
                    own_label,
                )
                .await
            }
            Err(e) => Err(e.into()),
        }
    }

    fn scan(
        slots: &[crate::models::DaySlot],
        scan_start: NaiveDate,
        days: usize,
        max_suggestions: usize,
        horizon_days: u32,
        own_label: Option<&str>,
    ) -> Vec<NaiveDate> {
        let mut found = Vec::new();
        for offset in 0..horizon_days as usize {
            if found.len() >= max_suggestions || offset + days > slots.len() {
                break;
            }
            let window = &slots[offset..offset + days];
            if conflicts_in(window, own_label).is_empty() {
                found.push(scan_start + Duration::days(offset as i64));
            }
        }
        found
    }

    async fn scan_clipped(
        &self,
        technician: &str,
        scan_start: NaiveDate,
        days: i32,
        max_suggestions: usize,
        horizon_days: u32,
        own_label: Option<&str>,
    ) -> AppResult<Vec<NaiveDate>> {
        let mut found = Vec::new();
        for offset in 0..i64::from(horizon_days) {
            if found.len() >= max_suggestions {
                break;
            }
            let candidate = scan_start + Duration::days(offset);
            let end = candidate + Duration::days(i64::from(days) - 1);
            match self.calendar.list_slots(technician, candidate, end).await {
                Ok(slots) => {
                    if conflicts_in(&slots, own_label).is_empty() {
                        found.push(candidate);
                    }
                }
                Err(CalendarError::SlotNotFound(_)) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::SlotState,
        services::{availability::AvailabilityService, calendar::InMemoryCalendarStore},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_first_free_window_after_conflict() {
        // Scenario: 2026-03-11 is confirmed, so 03-10..03-12 was rejected.
        let store = Arc::new(InMemoryCalendarStore::new());
        store.set_slot(
            "d.alvarez",
            date(2026, 3, 11),
            SlotState::Confirmed,
            Some("TR-000107"),
        );

        let suggestions = SuggestionService::new(store)
            .suggest("d.alvarez", date(2026, 3, 10), 3, 1, 30, None)
            .await
            .unwrap();

        assert_eq!(suggestions, vec![date(2026, 3, 12)]);
    }

    #[tokio::test]
    async fn test_never_suggests_on_or_before_requested_start() {
        let store = Arc::new(InMemoryCalendarStore::new());
        let suggestions = SuggestionService::new(store)
            .suggest("d.alvarez", date(2026, 3, 10), 2, 5, 30, None)
            .await
            .unwrap();

        assert_eq!(suggestions.len(), 5);
        for suggestion in &suggestions {
            assert!(*suggestion > date(2026, 3, 10));
        }
        // Earliest first, strictly by date
        assert_eq!(suggestions[0], date(2026, 3, 11));
        assert!(suggestions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_suggestions_recheck_as_available() {
        let store = Arc::new(InMemoryCalendarStore::new());
        store.set_slot("d.alvarez", date(2026, 3, 12), SlotState::Blocked, None);
        store.set_slot(
            "d.alvarez",
            date(2026, 3, 15),
            SlotState::Tentative,
            Some("TR-000200"),
        );

        let suggestions = SuggestionService::new(store.clone())
            .suggest("d.alvarez", date(2026, 3, 10), 3, 3, 30, None)
            .await
            .unwrap();
        assert!(!suggestions.is_empty());

        let checker = AvailabilityService::new(store);
        for start in suggestions {
            let report = checker.check("d.alvarez", start, 3, None).await.unwrap();
            assert!(report.available, "suggested {} re-checked as busy", start);
        }
    }

    #[tokio::test]
    async fn test_exhausted_horizon_returns_what_was_found() {
        let store = Arc::new(InMemoryCalendarStore::new());
        // Every second day blocked: no 3-day window anywhere.
        let mut day = date(2026, 3, 11);
        for _ in 0..40 {
            store.set_slot("d.alvarez", day, SlotState::Blocked, None);
            day += Duration::days(2);
        }

        let suggestions = SuggestionService::new(store)
            .suggest("d.alvarez", date(2026, 3, 10), 3, 3, 30, None)
            .await
            .unwrap();
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_short_sheet_horizon_clips_scan() {
        let store = Arc::new(InMemoryCalendarStore::with_horizon_end(date(2026, 3, 16)));
        store.set_slot("d.alvarez", date(2026, 3, 11), SlotState::Blocked, None);

        let suggestions = SuggestionService::new(store)
            .suggest("d.alvarez", date(2026, 3, 10), 2, 5, 60, None)
            .await
            .unwrap();

        // Windows past the sheet's tracked range are never suggested.
        assert_eq!(suggestions, vec![date(2026, 3, 12), date(2026, 3, 13), date(2026, 3, 14), date(2026, 3, 15)]);
    }
}

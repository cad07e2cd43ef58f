//! Background poller detecting external calendar confirmations
//!
//! A human confirms a tentative booking by flipping the slot status in the
//! shared sheet. Nothing notifies us, so a recurring sweep re-reads every
//! pending request's calendar range and drives the scheduler transition when
//! the whole range reads confirmed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{
    config::PollerConfig,
    error::{AppError, AppResult},
    models::{CalendarEventRef, SlotState, TrainingRequest},
    repository::RequestStore,
    services::{calendar::CalendarStore, scheduling::SchedulingService},
};

#[derive(Clone)]
pub struct ConfirmationPoller {
    store: Arc<dyn RequestStore>,
    calendar: Arc<dyn CalendarStore>,
    scheduler: SchedulingService,
    interval: Duration,
    max_concurrent: usize,
}

impl ConfirmationPoller {
    pub fn new(
        store: Arc<dyn RequestStore>,
        calendar: Arc<dyn CalendarStore>,
        scheduler: SchedulingService,
        config: &PollerConfig,
    ) -> Self {
        Self {
            store,
            calendar,
            scheduler,
            interval: Duration::from_secs(config.interval_seconds),
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    /// Run sweeps until the cancellation token trips. A sweep in flight at
    /// shutdown finishes; cancellation is only observed between sweeps.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_concurrent = self.max_concurrent,
            "Confirmation poller started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Confirmation poller shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let (checked, confirmed) = self.sweep().await;
                    if checked > 0 {
                        tracing::debug!(checked, confirmed, "Confirmation sweep finished");
                    }
                }
            }
        }
    }

    /// One sweep over the book of pending requests. Failures are logged per
    /// request and never abort the rest. Returns (checked, confirmed).
    pub async fn sweep(&self) -> (usize, usize) {
        let pending = match self.store.list_pending_confirmation().await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "Confirmation sweep could not list pending requests");
                return (0, 0);
            }
        };

        // The sheet service is the bottleneck; cap in-flight checks
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for request in pending {
            let poller = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let reference = request.reference_code.clone();
                (reference, poller.check_request(&request).await)
            });
        }

        let mut checked = 0;
        let mut confirmed = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok((_, Ok(true))) => {
                    checked += 1;
                    confirmed += 1;
                }
                Ok((_, Ok(false))) => checked += 1,
                Ok((reference, Err(e))) => {
                    checked += 1;
                    tracing::warn!(
                        reference = %reference,
                        error = %e,
                        "Confirmation check failed, will retry on next sweep"
                    );
                }
                Err(e) => tracing::error!(error = %e, "Confirmation check task failed"),
            }
        }
        (checked, confirmed)
    }

    /// Re-read one request's calendar range; returns true when the request
    /// was confirmed (or its pending notification was retried)
    async fn check_request(&self, request: &TrainingRequest) -> AppResult<bool> {
        let event_ref: CalendarEventRef = request
            .calendar_event_ref
            .as_deref()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "request {} is pending confirmation without a calendar event ref",
                    request.reference_code
                ))
            })?
            .parse()
            .map_err(AppError::Internal)?;

        // Cheap probe before fetching the whole range
        let first = self
            .calendar
            .read_slot(&event_ref.technician, event_ref.start)
            .await?;
        if first.state != SlotState::Confirmed {
            return Ok(false);
        }

        let slots = self
            .calendar
            .list_slots(&event_ref.technician, event_ref.start, event_ref.end())
            .await?;

        if !slots.iter().all(|s| s.state == SlotState::Confirmed) {
            return Ok(false);
        }
        if let Some(foreign) = slots
            .iter()
            .find(|s| s.owner.as_deref().is_some_and(|o| o != request.reference_code))
        {
            tracing::warn!(
                reference = %request.reference_code,
                date = %foreign.date,
                owner = foreign.owner.as_deref().unwrap_or_default(),
                "Range confirmed under a different reference, leaving request pending"
            );
            return Ok(false);
        }

        self.scheduler
            .on_external_confirmation(request.id, Some(event_ref.start), Some(event_ref.end()))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::enums::{CalendarStatus, RequestStatus},
        repository::memory::{tentative_request, InMemoryRequestStore},
        services::{
            availability::AvailabilityService, calendar::InMemoryCalendarStore,
            email::MockNotifier,
        },
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn poller(
        store: Arc<InMemoryRequestStore>,
        calendar: Arc<InMemoryCalendarStore>,
        notifier: MockNotifier,
    ) -> ConfirmationPoller {
        let notifier: Arc<dyn crate::services::email::Notifier> = Arc::new(notifier);
        let scheduler = SchedulingService::new(
            store.clone(),
            calendar.clone(),
            notifier,
            AvailabilityService::new(calendar.clone()),
        );
        ConfirmationPoller::new(
            store,
            calendar,
            scheduler,
            &PollerConfig {
                interval_seconds: 300,
                max_concurrent: 4,
            },
        )
    }

    fn confirm_range(
        calendar: &InMemoryCalendarStore,
        technician: &str,
        start: NaiveDate,
        days: u32,
        owner: &str,
    ) {
        for offset in 0..i64::from(days) {
            calendar.set_slot(
                technician,
                start + chrono::Duration::days(offset),
                SlotState::Confirmed,
                Some(owner),
            );
        }
    }

    #[tokio::test]
    async fn test_sweep_confirms_fully_confirmed_range() {
        let store = Arc::new(InMemoryRequestStore::new());
        let calendar = Arc::new(InMemoryCalendarStore::new());
        let start = date(2026, 3, 10);
        store.insert(tentative_request(1, "TR-000001", "d.alvarez", start, 3));
        confirm_range(&calendar, "d.alvarez", start, 3, "TR-000001");

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_confirmation()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let poller = poller(store.clone(), calendar, notifier);
        assert_eq!(poller.sweep().await, (1, 1));

        let request = store.get(1).unwrap();
        assert_eq!(request.status(), RequestStatus::Confirmed);
        assert_eq!(request.confirmed_start_date, Some(start));
        assert!(request.confirmation_notification_sent);

        // A later sweep has nothing left to do
        assert_eq!(poller.sweep().await, (0, 0));
    }

    #[tokio::test]
    async fn test_sweep_leaves_unconfirmed_ranges_pending() {
        let store = Arc::new(InMemoryRequestStore::new());
        let calendar = Arc::new(InMemoryCalendarStore::new());
        let start = date(2026, 3, 10);
        store.insert(tentative_request(1, "TR-000001", "d.alvarez", start, 3));
        // Still tentative in the sheet
        calendar
            .write_tentative("d.alvarez", start, 3, "TR-000001")
            .await
            .unwrap();

        let poller = poller(store.clone(), calendar, MockNotifier::new());
        assert_eq!(poller.sweep().await, (1, 0));
        assert_eq!(store.get(1).unwrap().calendar_status(), CalendarStatus::Pending);
    }

    #[tokio::test]
    async fn test_partially_confirmed_range_stays_pending() {
        let store = Arc::new(InMemoryRequestStore::new());
        let calendar = Arc::new(InMemoryCalendarStore::new());
        let start = date(2026, 3, 10);
        store.insert(tentative_request(1, "TR-000001", "d.alvarez", start, 3));
        confirm_range(&calendar, "d.alvarez", start, 2, "TR-000001");
        calendar.set_slot(
            "d.alvarez",
            date(2026, 3, 12),
            SlotState::Tentative,
            Some("TR-000001"),
        );

        let poller = poller(store.clone(), calendar, MockNotifier::new());
        assert_eq!(poller.sweep().await, (1, 0));
        assert_eq!(store.get(1).unwrap().status(), RequestStatus::Tentative);
    }

    #[tokio::test]
    async fn test_foreign_confirmation_does_not_confirm_request() {
        let store = Arc::new(InMemoryRequestStore::new());
        let calendar = Arc::new(InMemoryCalendarStore::new());
        let start = date(2026, 3, 10);
        store.insert(tentative_request(1, "TR-000001", "d.alvarez", start, 2));
        confirm_range(&calendar, "d.alvarez", start, 2, "TR-000555");

        let poller = poller(store.clone(), calendar, MockNotifier::new());
        assert_eq!(poller.sweep().await, (1, 0));
        assert_eq!(store.get(1).unwrap().status(), RequestStatus::Tentative);
    }

    #[tokio::test]
    async fn test_bad_entry_does_not_stall_the_sweep() {
        let store = Arc::new(InMemoryRequestStore::new());
        let calendar = Arc::new(InMemoryCalendarStore::new());
        let start = date(2026, 3, 10);

        // Request 1 carries a malformed event ref; request 2 is confirmable
        let mut broken = tentative_request(1, "TR-000001", "d.alvarez", start, 2);
        broken.calendar_event_ref = Some("not-an-event-ref".to_string());
        store.insert(broken);
        store.insert(tentative_request(2, "TR-000002", "s.reed", start, 2));
        confirm_range(&calendar, "s.reed", start, 2, "TR-000002");

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_confirmation()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let poller = poller(store.clone(), calendar, notifier);
        assert_eq!(poller.sweep().await, (2, 1));

        assert_eq!(store.get(1).unwrap().status(), RequestStatus::Tentative);
        assert_eq!(store.get(2).unwrap().status(), RequestStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unreachable_range_is_retried_not_fatal() {
        // Horizon cut short makes the range read fail for request 1 only
        let store = Arc::new(InMemoryRequestStore::new());
        let calendar = Arc::new(InMemoryCalendarStore::with_horizon_end(date(2026, 3, 12)));
        store.insert(tentative_request(1, "TR-000001", "d.alvarez", date(2026, 3, 20), 2));
        store.insert(tentative_request(2, "TR-000002", "s.reed", date(2026, 3, 10), 2));
        confirm_range(&calendar, "s.reed", date(2026, 3, 10), 2, "TR-000002");

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_confirmation()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let poller = poller(store.clone(), calendar, notifier);
        assert_eq!(poller.sweep().await, (2, 1));
        assert_eq!(store.get(1).unwrap().status(), RequestStatus::Tentative);
        assert_eq!(store.get(2).unwrap().status(), RequestStatus::Confirmed);
    }
}

//! Training request lifecycle: date selection, external confirmation,
//! rejection
//!
//! This is the only place that decides user-visible scheduling outcomes.
//! The calendar is re-read immediately before every tentative write; the
//! window between that read and the write is accepted (humans edit the same
//! sheet) and narrowed, not eliminated.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStatus, CalendarEventRef, TrainingRequest,
    },
    repository::RequestStore,
    services::{
        availability::AvailabilityService,
        calendar::{booking_dates, CalendarError, CalendarStore},
        email::Notifier,
    },
};

#[derive(Clone)]
pub struct SchedulingService {
    store: Arc<dyn RequestStore>,
    calendar: Arc<dyn CalendarStore>,
    notifier: Arc<dyn Notifier>,
    availability: AvailabilityService,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn RequestStore>,
        calendar: Arc<dyn CalendarStore>,
        notifier: Arc<dyn Notifier>,
        availability: AvailabilityService,
    ) -> Self {
        Self {
            store,
            calendar,
            notifier,
            availability,
        }
    }

    /// Book the requested range tentatively: validate the range against the
    /// request's day count, re-check availability, write the tentative
    /// slots, and persist the transition to `tentative` / calendar-pending.
    ///
    /// Conflicts come back as [`AppError::DatesConflict`] with the blocking
    /// days; the caller is expected to fetch suggestions and retry.
    pub async fn select_dates(
        &self,
        reference: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<TrainingRequest> {
        let request = self.store.get_by_reference(reference).await?;

        match request.status() {
            RequestStatus::Pending | RequestStatus::DatesSelected | RequestStatus::Tentative => {}
            other => {
                return Err(AppError::InvalidTransition(format!(
                    "cannot select dates for request {} in status {}",
                    reference, other
                )))
            }
        }

        let range_days = (end - start).num_days() + 1;
        if range_days != i64::from(request.training_days) {
            return Err(AppError::Validation(format!(
                "range {}..{} spans {} day(s) but the request is for {} training day(s)",
                start, end, range_days, request.training_days
            )));
        }
        if end < Utc::now().date_naive() {
            return Err(AppError::Validation(format!(
                "range {}..{} is entirely in the past",
                start, end
            )));
        }

        let technician = request.assigned_technician.as_str();

        // Fresh availability read right before writing
        let report = self
            .availability
            .check(
                technician,
                start,
                i32::from(request.training_days),
                Some(reference),
            )
            .await?;
        if !report.available {
            return Err(AppError::DatesConflict(report.conflicts));
        }

        // A retry may leave an earlier tentative range behind; drop it
        // before booking the new one.
        if let Some(previous) = request
            .calendar_event_ref
            .as_deref()
            .and_then(|raw| raw.parse::<CalendarEventRef>().ok())
        {
            if previous.start != start || previous.days != request.training_days as u32 {
                let dates = booking_dates(previous.start, previous.days);
                if let Err(e) = self.calendar.clear_slots(technician, &dates).await {
                    tracing::warn!(
                        reference,
                        error = %e,
                        "Failed to clear stale tentative slots from a previous selection"
                    );
                }
            }
        }

        let days = request.training_days as u32;
        if let Err(e) = self
            .calendar
            .write_tentative(technician, start, days, reference)
            .await
        {
            return Err(match e {
                CalendarError::PartialWrite {
                    written,
                    requested,
                    message,
                } => {
                    tracing::warn!(
                        reference,
                        written = written.len(),
                        requested,
                        %message,
                        "Tentative write landed partially, rolling back"
                    );
                    if let Err(clear_err) = self.calendar.clear_slots(technician, &written).await {
                        tracing::error!(
                            reference,
                            error = %clear_err,
                            manual_reconciliation_required = true,
                            "Rollback of partial tentative write failed; slots left behind"
                        );
                    }
                    AppError::SchedulingFailed(format!(
                        "tentative booking failed after {} of {} day(s)",
                        written.len(),
                        requested
                    ))
                }
                other => other.into(),
            });
        }

        let event_ref = CalendarEventRef {
            technician: technician.to_string(),
            start,
            days,
        };
        let updated = self
            .store
            .set_dates_selected(request.id, start, end, &event_ref.to_string())
            .await?;

        tracing::info!(
            reference,
            technician,
            %start,
            %end,
            "Tentative booking written, awaiting confirmation"
        );
        Ok(updated)
    }

    /// Apply an externally observed confirmation. Called by the poller only.
    ///
    /// Idempotent: once the request is confirmed and its notification latch
    /// is set, further calls do nothing. A confirmed request whose latch is
    /// still unset (notification failed or the process died between send and
    /// latch) retries the notification.
    pub async fn on_external_confirmation(
        &self,
        id: i32,
        confirmed_start: Option<NaiveDate>,
        confirmed_end: Option<NaiveDate>,
    ) -> AppResult<()> {
        let request = self.store.get_by_id(id).await?;

        let request = match request.status() {
            RequestStatus::Confirmed if request.confirmation_notification_sent => return Ok(()),
            RequestStatus::Confirmed => request,
            RequestStatus::Tentative | RequestStatus::DatesSelected => {
                // Fall back to the requested dates when the calendar gave no
                // explicit confirmed range
                let start = confirmed_start
                    .or(request.requested_start_date)
                    .ok_or_else(|| {
                        AppError::Internal(format!("request {} has no dates to confirm", id))
                    })?;
                let end = confirmed_end.or(request.requested_end_date).ok_or_else(|| {
                    AppError::Internal(format!("request {} has no dates to confirm", id))
                })?;
                let updated = self.store.mark_confirmed(id, start, end).await?;
                tracing::info!(
                    reference = %updated.reference_code,
                    %start,
                    %end,
                    "External confirmation observed"
                );
                updated
            }
            other => {
                return Err(AppError::InvalidTransition(format!(
                    "request {} cannot be confirmed from status {}",
                    id, other
                )))
            }
        };

        if !request.confirmation_notification_sent {
            let (start, end) = match (request.confirmed_start_date, request.confirmed_end_date) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    return Err(AppError::Internal(format!(
                        "confirmed request {} is missing confirmed dates",
                        id
                    )))
                }
            };
            match self.notifier.send_confirmation(&request, start, end).await {
                Ok(()) => self.store.set_notification_sent(id).await?,
                Err(e) => {
                    // Latch stays unset, so the next sweep retries the send
                    tracing::warn!(
                        reference = %request.reference_code,
                        error = %e,
                        "Confirmation notification failed, will retry on next sweep"
                    );
                }
            }
        }

        Ok(())
    }

    /// Reject a request, dropping any tentative slots it holds (best
    /// effort) and notifying the client
    pub async fn reject(&self, reference: &str, reason: &str) -> AppResult<TrainingRequest> {
        let request = self.store.get_by_reference(reference).await?;

        match request.status() {
            RequestStatus::Pending | RequestStatus::DatesSelected | RequestStatus::Tentative => {}
            other => {
                return Err(AppError::InvalidTransition(format!(
                    "request {} cannot be rejected from status {}",
                    reference, other
                )))
            }
        }

        if let Some(raw) = request.calendar_event_ref.as_deref() {
            match raw.parse::<CalendarEventRef>() {
                Ok(event_ref) => {
                    let dates = booking_dates(event_ref.start, event_ref.days);
                    if let Err(e) = self
                        .calendar
                        .clear_slots(&event_ref.technician, &dates)
                        .await
                    {
                        tracing::warn!(
                            reference,
                            error = %e,
                            "Failed to clear tentative slots while rejecting"
                        );
                    }
                }
                Err(e) => tracing::warn!(reference, error = %e, "Unreadable calendar event ref"),
            }
        }

        let updated = self.store.mark_rejected(request.id, reason).await?;

        if let Err(e) = self.notifier.send_rejection(&updated, reason).await {
            tracing::warn!(reference, error = %e, "Rejection notification failed");
        }

        tracing::info!(reference, reason, "Request rejected");
        Ok(updated)
    }

    /// Downstream business completion; only valid once confirmed
    pub async fn complete(&self, reference: &str) -> AppResult<TrainingRequest> {
        let request = self.store.get_by_reference(reference).await?;
        if request.status() != RequestStatus::Confirmed {
            return Err(AppError::InvalidTransition(format!(
                "request {} cannot be completed from status {}",
                reference,
                request.status()
            )));
        }
        self.store.mark_completed(request.id).await
    }
}

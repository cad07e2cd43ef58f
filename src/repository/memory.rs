//! In-memory request store used by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{CalendarStatus, RequestStatus},
        NewTrainingRequest, TrainingRequest,
    },
    repository::RequestStore,
};

#[derive(Default)]
pub struct InMemoryRequestStore {
    requests: Mutex<HashMap<i32, TrainingRequest>>,
    next_id: AtomicI32,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    /// Seed a prebuilt request, returning its id
    pub fn insert(&self, request: TrainingRequest) -> i32 {
        let id = request.id;
        self.requests.lock().unwrap().insert(id, request);
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
        id
    }

    pub fn get(&self, id: i32) -> Option<TrainingRequest> {
        self.requests.lock().unwrap().get(&id).cloned()
    }
}

/// Build a request in `tentative` state with a written tentative booking,
/// the usual starting point for scheduler and poller tests
pub fn tentative_request(
    id: i32,
    reference: &str,
    technician: &str,
    start: NaiveDate,
    days: i16,
) -> TrainingRequest {
    let end = start + chrono::Duration::days(i64::from(days) - 1);
    let mut request = pending_request(id, reference, technician, days);
    request.requested_start_date = Some(start);
    request.requested_end_date = Some(end);
    request.calendar_event_ref = Some(format!("{}:{}:{}", technician, start, days));
    request.status = i16::from(RequestStatus::Tentative);
    request.calendar_status = i16::from(CalendarStatus::Pending);
    request
}

/// Build a freshly-created request with no dates selected yet
pub fn pending_request(id: i32, reference: &str, technician: &str, days: i16) -> TrainingRequest {
    let now = Utc::now();
    TrainingRequest {
        id,
        reference_code: reference.to_string(),
        company: "Hartline Machining".to_string(),
        contact_name: "R. Hartline".to_string(),
        email: "shop@hartline.example".to_string(),
        phone: None,
        address: "41 Forge Rd".to_string(),
        city: "Dayton".to_string(),
        state: "OH".to_string(),
        machine_model: Some("VF-2SS".to_string()),
        training_days: days,
        training_price: Decimal::new(285_000, 2),
        travel_cost: Decimal::new(35_000, 2),
        total_price: Decimal::new(320_000, 2),
        assigned_technician: technician.to_string(),
        requested_start_date: None,
        requested_end_date: None,
        confirmed_start_date: None,
        confirmed_end_date: None,
        calendar_status: i16::from(CalendarStatus::None),
        calendar_event_ref: None,
        status: i16::from(RequestStatus::Pending),
        rejection_reason: None,
        confirmation_notification_sent: false,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create(&self, data: &NewTrainingRequest) -> AppResult<TrainingRequest> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let request = TrainingRequest {
            id,
            reference_code: format!("TR-{:06}", id),
            company: data.intake.company.clone(),
            contact_name: data.intake.contact_name.clone(),
            email: data.intake.email.clone(),
            phone: data.intake.phone.clone(),
            address: data.intake.address.clone(),
            city: data.intake.city.clone(),
            state: data.intake.state.clone(),
            machine_model: data.intake.machine_model.clone(),
            training_days: data.intake.training_days,
            training_price: data.quotation.training_price,
            travel_cost: data.quotation.travel_cost,
            total_price: data.quotation.total_price,
            assigned_technician: data.assigned_technician.clone(),
            requested_start_date: None,
            requested_end_date: None,
            confirmed_start_date: None,
            confirmed_end_date: None,
            calendar_status: i16::from(CalendarStatus::None),
            calendar_event_ref: None,
            status: i16::from(RequestStatus::Pending),
            rejection_reason: None,
            confirmation_notification_sent: false,
            created_at: now,
            updated_at: now,
        };
        self.requests.lock().unwrap().insert(id, request.clone());
        Ok(request)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<TrainingRequest> {
        self.get(id)
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))
    }

    async fn get_by_reference(&self, reference: &str) -> AppResult<TrainingRequest> {
        self.requests
            .lock()
            .unwrap()
            .values()
            .find(|r| r.reference_code == reference)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", reference)))
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>> {
        let mut rows: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| status.map_or(true, |s| r.status() == s))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn list_pending_confirmation(&self) -> AppResult<Vec<TrainingRequest>> {
        let mut rows: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.calendar_status() == CalendarStatus::Pending
                    || (r.calendar_status() == CalendarStatus::Confirmed
                        && !r.confirmation_notification_sent)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn set_dates_selected(
        &self,
        id: i32,
        start: NaiveDate,
        end: NaiveDate,
        event_ref: &str,
    ) -> AppResult<TrainingRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))?;
        request.requested_start_date = Some(start);
        request.requested_end_date = Some(end);
        request.calendar_event_ref = Some(event_ref.to_string());
        request.status = i16::from(RequestStatus::Tentative);
        request.calendar_status = i16::from(CalendarStatus::Pending);
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn mark_confirmed(
        &self,
        id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<TrainingRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))?;
        request.confirmed_start_date = Some(start);
        request.confirmed_end_date = Some(end);
        request.status = i16::from(RequestStatus::Confirmed);
        request.calendar_status = i16::from(CalendarStatus::Confirmed);
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn set_notification_sent(&self, id: i32) -> AppResult<()> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))?;
        request.confirmation_notification_sent = true;
        request.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_rejected(&self, id: i32, reason: &str) -> AppResult<TrainingRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))?;
        request.status = i16::from(RequestStatus::Rejected);
        request.rejection_reason = Some(reason.to_string());
        request.calendar_status = i16::from(CalendarStatus::None);
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn mark_completed(&self, id: i32) -> AppResult<TrainingRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))?;
        request.status = i16::from(RequestStatus::Completed);
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

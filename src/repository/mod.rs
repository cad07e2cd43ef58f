//! Repository layer for database operations

pub mod requests;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{NewTrainingRequest, RequestStatus, TrainingRequest},
};

/// Persistence contract for training requests. The scheduling core talks to
/// this trait only, so tests can substitute an in-memory store.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create(&self, data: &NewTrainingRequest) -> AppResult<TrainingRequest>;

    async fn get_by_id(&self, id: i32) -> AppResult<TrainingRequest>;

    async fn get_by_reference(&self, reference: &str) -> AppResult<TrainingRequest>;

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>>;

    /// Requests the confirmation poller must look at: calendar status still
    /// pending, plus confirmed requests whose notification never went out.
    async fn list_pending_confirmation(&self) -> AppResult<Vec<TrainingRequest>>;

    /// Persist the outcome of a successful tentative booking: requested
    /// dates, tentative status, pending calendar status and the event ref,
    /// all in one update.
    async fn set_dates_selected(
        &self,
        id: i32,
        start: NaiveDate,
        end: NaiveDate,
        event_ref: &str,
    ) -> AppResult<TrainingRequest>;

    /// Persist an externally observed confirmation: confirmed dates plus the
    /// confirmed status pair, in one update.
    async fn mark_confirmed(
        &self,
        id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<TrainingRequest>;

    /// Latch the confirmation-notification flag. Separate from
    /// [`mark_confirmed`](Self::mark_confirmed) because the latch is only
    /// written after the notification actually went out.
    async fn set_notification_sent(&self, id: i32) -> AppResult<()>;

    async fn mark_rejected(&self, id: i32, reason: &str) -> AppResult<TrainingRequest>;

    async fn mark_completed(&self, id: i32) -> AppResult<TrainingRequest>;

    /// Cheap connectivity probe for the readiness endpoint
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub requests: requests::TrainingRequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            requests: requests::TrainingRequestsRepository::new(pool.clone()),
            pool,
        }
    }
}

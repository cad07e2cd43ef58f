//! Training requests repository for database operations

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{CalendarStatus, RequestStatus},
        NewTrainingRequest, TrainingRequest,
    },
    repository::RequestStore,
};

#[derive(Clone)]
pub struct TrainingRequestsRepository {
    pool: Pool<Postgres>,
}

impl TrainingRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Draw the next value from the reference sequence and format it as a
    /// human-readable reference code
    async fn next_reference_code(&self) -> AppResult<String> {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('training_request_ref_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(format!("TR-{:06}", seq))
    }
}

#[async_trait]
impl RequestStore for TrainingRequestsRepository {
    async fn create(&self, data: &NewTrainingRequest) -> AppResult<TrainingRequest> {
        let reference_code = self.next_reference_code().await?;
        let now = Utc::now();

        let request = sqlx::query_as::<_, TrainingRequest>(
            r#"
            INSERT INTO training_requests (
                reference_code, company, contact_name, email, phone,
                address, city, state, machine_model, training_days,
                training_price, travel_cost, total_price,
                assigned_technician, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            RETURNING *
            "#,
        )
        .bind(&reference_code)
        .bind(&data.intake.company)
        .bind(&data.intake.contact_name)
        .bind(&data.intake.email)
        .bind(&data.intake.phone)
        .bind(&data.intake.address)
        .bind(&data.intake.city)
        .bind(&data.intake.state)
        .bind(&data.intake.machine_model)
        .bind(data.intake.training_days)
        .bind(data.quotation.training_price)
        .bind(data.quotation.travel_cost)
        .bind(data.quotation.total_price)
        .bind(&data.assigned_technician)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>("SELECT * FROM training_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))
    }

    async fn get_by_reference(&self, reference: &str) -> AppResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>(
            "SELECT * FROM training_requests WHERE reference_code = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", reference)))
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, TrainingRequest>(
                    "SELECT * FROM training_requests WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(i16::from(status))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TrainingRequest>(
                    "SELECT * FROM training_requests ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn list_pending_confirmation(&self) -> AppResult<Vec<TrainingRequest>> {
        let rows = sqlx::query_as::<_, TrainingRequest>(
            r#"
            SELECT * FROM training_requests
            WHERE calendar_status = $1
               OR (calendar_status = $2 AND confirmation_notification_sent = FALSE)
            ORDER BY id
            "#,
        )
        .bind(i16::from(CalendarStatus::Pending))
        .bind(i16::from(CalendarStatus::Confirmed))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_dates_selected(
        &self,
        id: i32,
        start: NaiveDate,
        end: NaiveDate,
        event_ref: &str,
    ) -> AppResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>(
            r#"
            UPDATE training_requests
            SET requested_start_date = $1,
                requested_end_date = $2,
                calendar_event_ref = $3,
                status = $4,
                calendar_status = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(event_ref)
        .bind(i16::from(RequestStatus::Tentative))
        .bind(i16::from(CalendarStatus::Pending))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))
    }

    async fn mark_confirmed(
        &self,
        id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>(
            r#"
            UPDATE training_requests
            SET confirmed_start_date = $1,
                confirmed_end_date = $2,
                status = $3,
                calendar_status = $4,
                updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(i16::from(RequestStatus::Confirmed))
        .bind(i16::from(CalendarStatus::Confirmed))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))
    }

    async fn set_notification_sent(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE training_requests SET confirmation_notification_sent = TRUE, updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Training request {} not found", id)));
        }
        Ok(())
    }

    async fn mark_rejected(&self, id: i32, reason: &str) -> AppResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>(
            r#"
            UPDATE training_requests
            SET status = $1,
                rejection_reason = $2,
                calendar_status = $3,
                updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(i16::from(RequestStatus::Rejected))
        .bind(reason)
        .bind(i16::from(CalendarStatus::None))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))
    }

    async fn mark_completed(&self, id: i32) -> AppResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>(
            r#"
            UPDATE training_requests
            SET status = $1, updated_at = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(i16::from(RequestStatus::Completed))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Training request {} not found", id)))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

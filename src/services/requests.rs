//! Training request intake and lookup

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{CreateTrainingRequest, NewTrainingRequest, RequestStatus, TrainingRequest},
    repository::RequestStore,
    services::{assignment, email::Notifier, quotes::QuoteService},
};

#[derive(Clone)]
pub struct RequestsService {
    store: Arc<dyn RequestStore>,
    quotes: QuoteService,
    notifier: Arc<dyn Notifier>,
}

impl RequestsService {
    pub fn new(store: Arc<dyn RequestStore>, quotes: QuoteService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            quotes,
            notifier,
        }
    }

    /// Intake: validate the submitted form, assign a reference code and a
    /// technician by region, compute and persist the quotation, and echo the
    /// quote to the client by email (fire-and-log)
    pub async fn create(&self, intake: CreateTrainingRequest) -> AppResult<TrainingRequest> {
        intake
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let technician = assignment::assign(&intake.state);
        let quotation = self.quotes.compute(&intake.state, intake.training_days);

        let request = self
            .store
            .create(&NewTrainingRequest {
                intake,
                assigned_technician: technician.to_string(),
                quotation,
            })
            .await?;

        if let Err(e) = self.notifier.send_quotation(&request).await {
            tracing::warn!(
                reference = %request.reference_code,
                error = %e,
                "Quotation email failed"
            );
        }

        tracing::info!(
            reference = %request.reference_code,
            technician,
            state = %request.state,
            training_days = request.training_days,
            "Training request created"
        );
        Ok(request)
    }

    pub async fn get(&self, reference: &str) -> AppResult<TrainingRequest> {
        self.store.get_by_reference(reference).await
    }

    pub async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>> {
        self.store.list(status).await
    }

    /// Database connectivity probe for the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

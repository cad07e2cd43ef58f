//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, requests, scheduling};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Spindle API",
        version = "1.0.0",
        description = "CNC Training Scheduling REST API",
        contact(name = "Spindle Training", email = "dev@spindletraining.com")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Requests
        requests::create_request,
        requests::list_requests,
        requests::get_request,
        // Scheduling
        scheduling::check_availability,
        scheduling::check_technician_availability,
        scheduling::suggest_alternatives,
        scheduling::select_dates,
        scheduling::reject_request,
        scheduling::complete_request,
    ),
    components(
        schemas(
            health::HealthResponse,
            scheduling::SelectDatesRequest,
            scheduling::SelectDatesResponse,
            scheduling::RejectRequest,
            crate::error::ErrorResponse,
            crate::models::request::TrainingRequest,
            crate::models::request::CreateTrainingRequest,
            crate::models::calendar::DaySlot,
            crate::models::calendar::SlotConflict,
            crate::models::calendar::AvailabilityReport,
            crate::models::quote::Quotation,
            crate::models::enums::RequestStatus,
            crate::models::enums::CalendarStatus,
            crate::models::enums::SlotState,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "requests", description = "Training request intake"),
        (name = "scheduling", description = "Availability and date coordination")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router serving the OpenAPI document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

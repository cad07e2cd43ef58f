//! Spindle - CNC Training Scheduling Server
//!
//! Coordinates training-request intake, quotation, technician assignment and
//! date scheduling against a shared team calendar, with email notifications
//! once a booking is confirmed.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

//! Business logic services

pub mod assignment;
pub mod availability;
pub mod calendar;
pub mod email;
pub mod poller;
pub mod quotes;
pub mod requests;
pub mod scheduling;
pub mod suggestions;

use std::sync::Arc;

use crate::{config::AppConfig, repository::RequestStore};

use calendar::CalendarStore;
use email::Notifier;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub requests: requests::RequestsService,
    pub availability: availability::AvailabilityService,
    pub suggestions: suggestions::SuggestionService,
    pub scheduling: scheduling::SchedulingService,
}

impl Services {
    /// Wire all services onto the store, calendar and notifier seams
    pub fn new(
        store: Arc<dyn RequestStore>,
        calendar: Arc<dyn CalendarStore>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        let availability = availability::AvailabilityService::new(calendar.clone());
        let quotes = quotes::QuoteService::new(&config.pricing);

        Self {
            requests: requests::RequestsService::new(store.clone(), quotes, notifier.clone()),
            availability: availability.clone(),
            suggestions: suggestions::SuggestionService::new(calendar.clone()),
            scheduling: scheduling::SchedulingService::new(store, calendar, notifier, availability),
        }
    }
}

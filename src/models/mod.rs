//! Data models for Spindle

pub mod calendar;
pub mod enums;
pub mod quote;
pub mod request;

// Re-export commonly used types
pub use calendar::{AvailabilityReport, CalendarEventRef, DaySlot, SlotConflict};
pub use enums::{CalendarStatus, RequestStatus, SlotState};
pub use quote::Quotation;
pub use request::{CreateTrainingRequest, NewTrainingRequest, TrainingRequest};

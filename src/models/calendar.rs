//! Calendar slot types and the persisted calendar-event reference

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::SlotState;

/// A single (technician, date) cell as read from the external calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub state: SlotState,
    /// Reference code of the request holding this slot, when tracked
    pub owner: Option<String>,
}

impl DaySlot {
    pub fn free(date: NaiveDate) -> Self {
        Self {
            date,
            state: SlotState::Free,
            owner: None,
        }
    }
}

/// One conflicting day inside a requested range, with a displayable reason
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotConflict {
    pub date: NaiveDate,
    pub state: SlotState,
    pub owner: Option<String>,
    /// Human-readable summary, e.g. "2026-03-11: confirmed (TR-000107)"
    pub summary: String,
}

impl SlotConflict {
    pub fn from_slot(slot: &DaySlot) -> Self {
        let summary = match &slot.owner {
            Some(owner) => format!("{}: {} ({})", slot.date, slot.state, owner),
            None => format!("{}: {}", slot.date, slot.state),
        };
        Self {
            date: slot.date,
            state: slot.state,
            owner: slot.owner.clone(),
            summary,
        }
    }
}

/// Result of an availability check over a date range
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityReport {
    pub available: bool,
    /// Conflicting days in calendar order; empty when available
    pub conflicts: Vec<SlotConflict>,
}

/// Opaque handle persisted on a request so the poller can re-query the
/// calendar range it wrote. Formatted as `technician:start_date:days`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventRef {
    pub technician: String,
    pub start: NaiveDate,
    pub days: u32,
}

impl CalendarEventRef {
    pub fn end(&self) -> NaiveDate {
        self.start + chrono::Duration::days(i64::from(self.days) - 1)
    }
}

impl std::fmt::Display for CalendarEventRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.technician, self.start, self.days)
    }
}

impl std::str::FromStr for CalendarEventRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let technician = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("malformed calendar event ref '{}'", s))?;
        let start = parts
            .next()
            .and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok())
            .ok_or_else(|| format!("malformed calendar event ref '{}'", s))?;
        let days = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|d| *d > 0)
            .ok_or_else(|| format!("malformed calendar event ref '{}'", s))?;

        Ok(Self {
            technician: technician.to_string(),
            start,
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ref_format_and_parse() {
        let event_ref = CalendarEventRef {
            technician: "p.kowalski".to_string(),
            start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            days: 3,
        };
        let s = event_ref.to_string();
        assert_eq!(s, "p.kowalski:2026-03-10:3");
        assert_eq!(s.parse::<CalendarEventRef>().unwrap(), event_ref);
        assert_eq!(
            event_ref.end(),
            NaiveDate::from_ymd_opt(2026, 3, 12).unwrap()
        );
    }

    #[test]
    fn test_event_ref_rejects_garbage() {
        assert!("".parse::<CalendarEventRef>().is_err());
        assert!("p.kowalski".parse::<CalendarEventRef>().is_err());
        assert!("p.kowalski:not-a-date:3".parse::<CalendarEventRef>().is_err());
        assert!("p.kowalski:2026-03-10:0".parse::<CalendarEventRef>().is_err());
    }
}

//! Technician assignment by service region
//!
//! Each technician covers a fixed set of US states. Assignment happens once
//! at intake and is never revisited by this module; the mapping must stay
//! deterministic so re-running intake logic can never move a request to a
//! different technician.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Fallback for unrecognized or out-of-roster state codes (headquarters
/// region covers anything the regional rosters do not)
pub const DEFAULT_TECHNICIAN: &str = "m.okafor";

static REGIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::new();

    // West — Diego Alvarez, based in Reno
    for state in [
        "WA", "OR", "CA", "NV", "ID", "MT", "WY", "UT", "CO", "AZ", "NM", "AK", "HI",
    ] {
        table.insert(state, "d.alvarez");
    }

    // Midwest — Piotr Kowalski, based in Chicago
    for state in [
        "ND", "SD", "NE", "KS", "MN", "IA", "MO", "WI", "IL", "MI", "IN", "OH",
    ] {
        table.insert(state, "p.kowalski");
    }

    // South — Shanice Reed, based in Atlanta
    for state in [
        "TX", "OK", "AR", "LA", "MS", "AL", "TN", "KY", "GA", "FL", "SC", "NC", "WV", "VA",
    ] {
        table.insert(state, "s.reed");
    }

    // Northeast — Mina Okafor, based in Hartford
    for state in [
        "MD", "DE", "DC", "PA", "NJ", "NY", "CT", "RI", "MA", "VT", "NH", "ME",
    ] {
        table.insert(state, "m.okafor");
    }

    table
});

/// Map a two-letter US state code to the technician covering it. Total:
/// unknown codes fall back to [`DEFAULT_TECHNICIAN`].
pub fn assign(state: &str) -> &'static str {
    REGIONS
        .get(state.to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_TECHNICIAN)
}

//! Quotation computation (training fee + travel costs)
//!
//! Pure and stateless: the result is persisted at intake and never consulted
//! by the scheduling core.

use rust_decimal::Decimal;

use crate::{config::PricingConfig, models::Quotation};

/// Flat travel charge per zone, keyed off how far the state sits from the
/// nearest regional base
fn travel_cost_for(state: &str) -> Decimal {
    let zone_near = Decimal::new(35_000, 2); // 350.00
    let zone_mid = Decimal::new(65_000, 2); // 650.00
    let zone_far = Decimal::new(120_000, 2); // 1200.00

    match state.to_ascii_uppercase().as_str() {
        // Same-state or neighboring the four regional bases
        "NV" | "IL" | "GA" | "CT" | "OH" | "IN" | "WI" | "CA" | "AZ" | "TN" | "AL" | "SC"
        | "NY" | "NJ" | "MA" | "RI" => zone_near,
        // Continental, a flight away
        "AK" | "HI" => zone_far,
        _ => zone_mid,
    }
}

#[derive(Clone)]
pub struct QuoteService {
    day_rate: Decimal,
}

impl QuoteService {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            day_rate: config.day_rate,
        }
    }

    /// Compute the quotation for a request: per-day training fee times the
    /// day count, plus a zone-based travel charge
    pub fn compute(&self, state: &str, training_days: i16) -> Quotation {
        let training_price = self.day_rate * Decimal::from(training_days);
        let travel_cost = travel_cost_for(state);
        Quotation {
            training_price,
            travel_cost,
            total_price: training_price + travel_cost,
        }
    }
}

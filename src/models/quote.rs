//! Quotation computed at intake

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Price quotation for a training request. Computed once when the request is
/// created; scheduling never consults it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Quotation {
    pub training_price: Decimal,
    pub travel_cost: Decimal,
    pub total_price: Decimal,
}

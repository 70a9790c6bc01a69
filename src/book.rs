use serde::{Deserialize, Serialize};

use crate::orders::Side;

/// One resting order-book level, as delivered by a depth snapshot.
///
/// Entries are ephemeral: the estimator is handed a flat slice of them per
/// call and keeps nothing between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    pub price: f64,
    pub amount: f64,
    pub side: Side,
}

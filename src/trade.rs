use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One print from the public trade tape.
///
/// The estimator uses the tape for two things only:
/// - `price` feeds the realized-volatility calculation
/// - `amount` feeds the rolling 24h volume
///
/// `timestamp` decides whether the trade still falls inside the rolling
/// window; anything older is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub price: f64,
    pub amount: f64,
    pub timestamp: SystemTime,
}

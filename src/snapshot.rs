use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::SystemTime};

use crate::{
    book::OrderBookEntry,
    conditions::{MarketConditions, calculate_market_conditions, calculate_market_conditions_at},
    errors::SnapshotError,
    instrument::Pair,
    trade::Trade,
};

/// A point-in-time capture of one market: reference price, depth snapshot,
/// and recent trade tape. This is the CLI's input format, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub pair: Pair,
    pub current_price: f64,
    pub book: Vec<OrderBookEntry>,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl MarketSnapshot {
    /// Read and validate a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)?;
        let snapshot: MarketSnapshot = serde_json::from_str(&raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Prices must be positive and finite, amounts non-negative and finite.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !(self.current_price > 0.0) || !self.current_price.is_finite() {
            return Err(SnapshotError::Invalid(
                "current_price must be positive".to_string(),
            ));
        }
        for entry in &self.book {
            if !(entry.price > 0.0) || !entry.price.is_finite() {
                return Err(SnapshotError::Invalid(format!(
                    "book entry has bad price: {}",
                    entry.price
                )));
            }
            if !(entry.amount >= 0.0) || !entry.amount.is_finite() {
                return Err(SnapshotError::Invalid(format!(
                    "book entry has bad amount: {}",
                    entry.amount
                )));
            }
        }
        for trade in &self.trades {
            if !(trade.price > 0.0) || !trade.price.is_finite() {
                return Err(SnapshotError::Invalid(format!(
                    "trade has bad price: {}",
                    trade.price
                )));
            }
            if !(trade.amount >= 0.0) || !trade.amount.is_finite() {
                return Err(SnapshotError::Invalid(format!(
                    "trade has bad amount: {}",
                    trade.amount
                )));
            }
        }
        Ok(())
    }

    /// Market conditions for this snapshot, relative to the current wall clock.
    pub fn conditions(&self) -> MarketConditions {
        calculate_market_conditions(&self.book, &self.trades, self.current_price)
    }

    /// Deterministic variant with a pinned observation time.
    pub fn conditions_at(&self, now: SystemTime) -> MarketConditions {
        calculate_market_conditions_at(&self.book, &self.trades, self.current_price, now)
    }
}

use serde::Serialize;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use uuid::Uuid;

use crate::{estimator::FillTimeEstimate, instrument::Pair, orders::OrderSpec};

/// The log is bounded; oldest records fall off the front.
pub const ESTIMATE_LOG_CAP: usize = 10_000;

/// One served estimate, retained in memory for the recent-estimates endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateRecord {
    pub id: Uuid,
    pub pair: Pair,
    pub order: OrderSpec,
    pub estimate: FillTimeEstimate,
    pub created_at: SystemTime,
}

#[derive(Clone)]
pub struct AppState {
    pub estimate_log: Arc<Mutex<VecDeque<EstimateRecord>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            estimate_log: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn record(&self, record: EstimateRecord) {
        let mut log = self.estimate_log.lock().unwrap();
        if log.len() == ESTIMATE_LOG_CAP {
            log.pop_front();
        }
        log.push_back(record);
    }

    /// Most recent records for `pair`, newest first.
    pub fn recent(&self, pair: Pair, limit: usize) -> Vec<EstimateRecord> {
        self.estimate_log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.pair == pair)
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}

use std::time::SystemTime;

use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::{
    book::OrderBookEntry,
    conditions::{MarketConditions, calculate_market_conditions},
    estimator::{FillTimeEstimate, estimate_fill_time},
    instrument::Pair,
    orders::{OrderSpec, OrderType},
    state::{AppState, EstimateRecord},
    trade::Trade,
};

/// Hard cap on how many log records one request may fetch.
const MAX_LOG_LIMIT: usize = 1000;
const DEFAULT_LOG_LIMIT: usize = 100;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct EstimateRequest {
    pub pair: Pair,
    pub order: OrderSpec,
    pub book: Vec<OrderBookEntry>,
    #[serde(default)]
    pub trades: Vec<Trade>,
    pub current_price: f64,
    /// Optional pre-computed conditions; derived from the snapshot when absent.
    #[serde(default)]
    pub market: Option<MarketConditions>,
}

#[derive(Serialize)]
pub struct EstimateResponse {
    pub id: Uuid,
    pub pair: Pair,
    pub estimate: FillTimeEstimate,
    pub market: MarketConditions,
    pub explanation: String,
}

#[debug_handler]
pub async fn create_estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, ApiError> {
    if !(req.order.size > 0.0) || !req.order.size.is_finite() {
        return Err(ApiError::bad_request("size must be > 0"));
    }
    if req.order.order_type != OrderType::Market
        && (!(req.order.price > 0.0) || !req.order.price.is_finite())
    {
        return Err(ApiError::bad_request("price must be > 0"));
    }

    let market = match req.market {
        Some(market) => market,
        None => {
            if !(req.current_price > 0.0) || !req.current_price.is_finite() {
                return Err(ApiError::bad_request("current_price must be > 0"));
            }
            calculate_market_conditions(&req.book, &req.trades, req.current_price)
        }
    };

    let estimate = estimate_fill_time(&req.order, &req.book, &market);
    let id = Uuid::new_v4();
    state.record(EstimateRecord {
        id,
        pair: req.pair,
        order: req.order,
        estimate: estimate.clone(),
        created_at: SystemTime::now(),
    });
    info!(pair = %req.pair, window = %estimate.estimated_time, "served fill estimate");

    let explanation = estimate.explanation();
    Ok(Json(EstimateResponse {
        id,
        pair: req.pair,
        estimate,
        market,
        explanation,
    }))
}

#[derive(Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
}

pub async fn recent_estimates(
    State(state): State<AppState>,
    Path(pair): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<(HeaderMap, Json<Vec<EstimateRecord>>), ApiError> {
    let pair: Pair = pair.parse().map_err(ApiError::bad_request)?;
    let effective = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    let mut headers = HeaderMap::new();
    headers.insert("x-effective-limit", HeaderValue::from(effective as u64));
    Ok((headers, Json(state.recent(pair, effective))))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/estimate", post(create_estimate))
        .route("/estimates/{pair}", get(recent_estimates))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

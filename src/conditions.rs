use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{book::OrderBookEntry, orders::Side, trade::Trade};

/// Trades older than this no longer count toward volatility or volume.
pub const TRADE_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Price band either side of mid that counts toward liquidity depth,
/// as a fraction of the mid-price.
const DEPTH_BAND: f64 = 0.01;

/// Realized volatility is only measured once the recent tape has more
/// prints than this; below it the sample is too small to trust.
const MIN_TRADES_FOR_VOLATILITY: usize = 10;

/// Fallback volatility for a thin tape.
const DEFAULT_VOLATILITY: f64 = 0.1;

/// A point-in-time summary of market liquidity and risk.
///
/// - `volatility` is the ratio of price standard deviation to mean over the
///   recent tape, clamped to `[0, 1]`
/// - `spread` is the best-bid/best-ask gap as a percentage of the reference
///   price
/// - `liquidity_depth` is the total resting quantity within 1% of mid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub volatility: f64,
    pub volume_24h: f64,
    pub spread: f64,
    pub liquidity_depth: f64,
}

/// Derives [`MarketConditions`] from a book snapshot and recent trade tape,
/// relative to the current wall clock.
///
/// `current_price` must be positive; callers validate it at the boundary.
pub fn calculate_market_conditions(
    book: &[OrderBookEntry],
    trades: &[Trade],
    current_price: f64,
) -> MarketConditions {
    calculate_market_conditions_at(book, trades, current_price, SystemTime::now())
}

/// Deterministic core of [`calculate_market_conditions`]: the observation
/// time is a parameter, so tests and replays can pin the 24h window.
///
/// # Behavior
/// - Best bid falls back to `current_price * 0.999` when the book has no
///   buys; best ask to `current_price * 1.001` when it has no sells. An empty
///   book therefore yields a ~0.2% synthetic spread rather than a degenerate
///   zero.
/// - Liquidity depth sums every resting amount within 1% of the mid-price,
///   both sides.
/// - Volatility is stddev/mean of recent trade prices when the tape has more
///   than ten prints in the window, else 0.1.
pub fn calculate_market_conditions_at(
    book: &[OrderBookEntry],
    trades: &[Trade],
    current_price: f64,
    now: SystemTime,
) -> MarketConditions {
    let best_bid = book
        .iter()
        .filter(|e| e.side == Side::Buy)
        .map(|e| e.price)
        .max_by(f64::total_cmp)
        .unwrap_or(current_price * 0.999);
    let best_ask = book
        .iter()
        .filter(|e| e.side == Side::Sell)
        .map(|e| e.price)
        .min_by(f64::total_cmp)
        .unwrap_or(current_price * 1.001);

    let spread = (best_ask - best_bid) / current_price * 100.0;

    let mid = (best_bid + best_ask) / 2.0;
    let band = mid * DEPTH_BAND;
    let liquidity_depth = book
        .iter()
        .filter(|e| (e.price - mid).abs() <= band)
        .map(|e| e.amount)
        .sum();

    let cutoff = now.checked_sub(TRADE_WINDOW).unwrap_or(UNIX_EPOCH);
    let recent: Vec<&Trade> = trades.iter().filter(|t| t.timestamp >= cutoff).collect();

    let volatility = realized_volatility(&recent);
    let volume_24h = recent.iter().map(|t| t.amount).sum();

    MarketConditions {
        volatility,
        volume_24h,
        spread,
        liquidity_depth,
    }
}

fn realized_volatility(recent: &[&Trade]) -> f64 {
    if recent.len() <= MIN_TRADES_FOR_VOLATILITY {
        return DEFAULT_VOLATILITY;
    }
    let n = recent.len() as f64;
    let mean = recent.iter().map(|t| t.price).sum::<f64>() / n;
    // a tape of zero-priced prints carries no usable signal
    if !(mean > 0.0) {
        return DEFAULT_VOLATILITY;
    }
    //population variance, not sample variance
    let variance = recent.iter().map(|t| (t.price - mean).powi(2)).sum::<f64>() / n;
    (variance.sqrt() / mean).min(1.0)
}

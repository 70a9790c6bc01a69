use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{
    book::OrderBookEntry,
    conditions::MarketConditions,
    orders::{OrderSpec, OrderType, Side},
};

/// Markets trading less than this much base volume over 24h get every
/// estimate pushed into its slower window.
pub const LOW_VOLUME_THRESHOLD: f64 = 1_000_000.0;

/// Slippage estimates are capped at this percentage.
pub const MAX_SLIPPAGE_PCT: f64 = 5.0;

/// An [`FillWindow`] is one of the fixed, human-readable time ranges an
/// estimate can quote.
///
/// The set is closed on purpose: the classifier produces only the six base
/// ranges, and the thin-volume adjustment maps each of those onto a slower
/// range. Modelling them as an enum (rather than strings) makes both tables
/// exhaustively checked at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FillWindow {
    Immediate,
    Unknown,
    OneToThreeMin,
    TwoToFiveMin,
    FiveToFifteenMin,
    TenToThirtyMin,
    ThirtyToSixtyMin,
    OneToFourHours,
    ThreeToEightMin,
    FiveToTwelveMin,
    TwentyToSixtyMin,
    OneToTwoHours,
    TwoToEightHours,
}

impl FillWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            FillWindow::Immediate => "Immediate",
            FillWindow::Unknown => "Unknown",
            FillWindow::OneToThreeMin => "1-3 min",
            FillWindow::TwoToFiveMin => "2-5 min",
            FillWindow::FiveToFifteenMin => "5-15 min",
            FillWindow::TenToThirtyMin => "10-30 min",
            FillWindow::ThirtyToSixtyMin => "30-60 min",
            FillWindow::OneToFourHours => "1-4 hours",
            FillWindow::ThreeToEightMin => "3-8 min",
            FillWindow::FiveToTwelveMin => "5-12 min",
            FillWindow::TwentyToSixtyMin => "20-60 min",
            FillWindow::OneToTwoHours => "1-2 hours",
            FillWindow::TwoToEightHours => "2-8 hours",
        }
    }

    /// The window quoted instead when the market trades thin 24h volume.
    ///
    /// Only the six base ranges slow down; everything else (including
    /// `Immediate` and `Unknown`) maps to itself.
    pub fn slowed(self) -> FillWindow {
        match self {
            FillWindow::OneToThreeMin => FillWindow::ThreeToEightMin,
            FillWindow::TwoToFiveMin => FillWindow::FiveToTwelveMin,
            FillWindow::FiveToFifteenMin => FillWindow::TenToThirtyMin,
            FillWindow::TenToThirtyMin => FillWindow::TwentyToSixtyMin,
            FillWindow::ThirtyToSixtyMin => FillWindow::OneToTwoHours,
            FillWindow::OneToFourHours => FillWindow::TwoToEightHours,
            other => other,
        }
    }
}

impl fmt::Display for FillWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FillWindow> for String {
    fn from(w: FillWindow) -> String {
        w.as_str().to_string()
    }
}

impl TryFrom<String> for FillWindow {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "Immediate" => Ok(FillWindow::Immediate),
            "Unknown" => Ok(FillWindow::Unknown),
            "1-3 min" => Ok(FillWindow::OneToThreeMin),
            "2-5 min" => Ok(FillWindow::TwoToFiveMin),
            "5-15 min" => Ok(FillWindow::FiveToFifteenMin),
            "10-30 min" => Ok(FillWindow::TenToThirtyMin),
            "30-60 min" => Ok(FillWindow::ThirtyToSixtyMin),
            "1-4 hours" => Ok(FillWindow::OneToFourHours),
            "3-8 min" => Ok(FillWindow::ThreeToEightMin),
            "5-12 min" => Ok(FillWindow::FiveToTwelveMin),
            "20-60 min" => Ok(FillWindow::TwentyToSixtyMin),
            "1-2 hours" => Ok(FillWindow::OneToTwoHours),
            "2-8 hours" => Ok(FillWindow::TwoToEightHours),
            _ => Err(format!("unknown fill window: `{}`", s)),
        }
    }
}

/// How much weight to put on an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn phrase(self) -> &'static str {
        match self {
            Confidence::High => "high confidence",
            Confidence::Medium => "moderate confidence",
            Confidence::Low => "low confidence",
        }
    }
}

/// The result of a fill-time estimate: a quoted time window, a confidence
/// label, a short reason, and (when meaningful) an expected slippage
/// percentage in `[0, 5]`.
///
/// Plain value object; there is no identity beyond the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillTimeEstimate {
    pub estimated_time: FillWindow,
    pub confidence: Confidence,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_estimate: Option<f64>,
}

impl FillTimeEstimate {
    fn flat(estimated_time: FillWindow, confidence: Confidence, reason: &str) -> Self {
        FillTimeEstimate {
            estimated_time,
            confidence,
            reason: reason.to_string(),
            slippage_estimate: None,
        }
    }

    /// One-line human-readable rendering, e.g.
    /// `Estimated fill time: 1-3 min (high confidence), ~0.01% slippage. High liquidity at target price`
    pub fn explanation(&self) -> String {
        let mut line = format!(
            "Estimated fill time: {} ({})",
            self.estimated_time,
            self.confidence.phrase()
        );
        if let Some(slippage) = self.slippage_estimate {
            line.push_str(&format!(", ~{:.2}% slippage", slippage));
        }
        line.push_str(&format!(". {}", self.reason));
        line
    }
}

const MARKET_ORDER_REASON: &str = "Market orders execute immediately at the best available price";
const NO_MATCH_REASON: &str = "No matching orders in order book";
const INVALID_ORDER_REASON: &str = "Order size and price must be positive";
const LOW_VOLUME_SUFFIX: &str = ", low market volume";

/// Estimates how long an order will take to fill against the given book
/// snapshot, and the slippage it should expect.
///
/// # Behavior
/// - Market orders are quoted `Immediate` unconditionally; they are assumed
///   always fillable against current depth, so no liquidity check runs.
/// - Limit and advanced orders are measured against the opposing side of the
///   book: the available liquidity is the flat sum of opposing amounts at
///   prices the order would accept (at-or-below the limit for a buy,
///   at-or-above for a sell).
/// - The liquidity-to-size ratio picks a fill percentage band, and the band
///   together with current volatility picks the quoted window.
/// - Thin 24h volume pushes the window into its slower counterpart and tags
///   the reason.
///
/// # Notes
/// - The sum is a filter-and-sum over the snapshot, not a depth-accurate
///   match simulation: consumed liquidity is not subtracted progressively.
/// - This function never panics and never returns non-finite numbers.
///   Degenerate orders (zero, negative, or non-finite size/price) come back
///   as `Unknown` rather than propagating NaN.
pub fn estimate_fill_time(
    order: &OrderSpec,
    book: &[OrderBookEntry],
    market: &MarketConditions,
) -> FillTimeEstimate {
    if order.order_type == OrderType::Market {
        return FillTimeEstimate::flat(FillWindow::Immediate, Confidence::High, MARKET_ORDER_REASON);
    }

    if !(order.size > 0.0)
        || !order.size.is_finite()
        || !(order.price > 0.0)
        || !order.price.is_finite()
    {
        return FillTimeEstimate::flat(FillWindow::Unknown, Confidence::Low, INVALID_ORDER_REASON);
    }

    let opposing = order.side.opposite();
    let mut seen_opposing = false;
    let mut available = 0.0;
    for entry in book.iter().filter(|e| e.side == opposing) {
        seen_opposing = true;
        let acceptable = match order.side {
            Side::Buy => entry.price <= order.price,
            Side::Sell => entry.price >= order.price,
        };
        if acceptable {
            available += entry.amount;
        }
    }
    if !seen_opposing {
        return FillTimeEstimate::flat(FillWindow::Unknown, Confidence::Low, NO_MATCH_REASON);
    }

    let fill_pct = (available / order.size * 100.0).min(100.0);
    let slippage_estimate = expected_slippage(order.size, market);

    let (window, confidence, reason) = classify(fill_pct, market.volatility);
    debug!(fill_pct, window = %window, "classified fill estimate");

    if market.volume_24h < LOW_VOLUME_THRESHOLD {
        FillTimeEstimate {
            estimated_time: window.slowed(),
            confidence,
            reason: format!("{reason}{LOW_VOLUME_SUFFIX}"),
            slippage_estimate,
        }
    } else {
        FillTimeEstimate {
            estimated_time: window,
            confidence,
            reason: reason.to_string(),
            slippage_estimate,
        }
    }
}

/// Fixed band table: fill percentage picks the row, volatility picks the
/// column. Thresholds are 0.3 for a near-full fill and 0.5 for a partial one.
fn classify(fill_pct: f64, volatility: f64) -> (FillWindow, Confidence, &'static str) {
    if fill_pct >= 90.0 {
        if volatility < 0.3 {
            (
                FillWindow::OneToThreeMin,
                Confidence::High,
                "High liquidity at target price",
            )
        } else {
            (
                FillWindow::TwoToFiveMin,
                Confidence::Medium,
                "Good liquidity, volatile market",
            )
        }
    } else if fill_pct >= 50.0 {
        if volatility < 0.5 {
            (
                FillWindow::FiveToFifteenMin,
                Confidence::Medium,
                "Moderate liquidity at target price",
            )
        } else {
            (
                FillWindow::TenToThirtyMin,
                Confidence::Medium,
                "Moderate liquidity, high volatility",
            )
        }
    } else if fill_pct >= 20.0 {
        (
            FillWindow::ThirtyToSixtyMin,
            Confidence::Low,
            "Limited liquidity at target price",
        )
    } else {
        (
            FillWindow::OneToFourHours,
            Confidence::Low,
            "Low liquidity, price may need to be adjusted",
        )
    }
}

/// Expected slippage in percent: the order's share of near-mid depth, scaled
/// by the spread, capped at [`MAX_SLIPPAGE_PCT`]. Absent when the market has
/// no measurable depth or the product rounds to nothing.
fn expected_slippage(size: f64, market: &MarketConditions) -> Option<f64> {
    if !(market.liquidity_depth > 0.0) || !market.liquidity_depth.is_finite() {
        return None;
    }
    let liquidity_ratio = size / market.liquidity_depth;
    let pct = (liquidity_ratio * market.spread * 10.0).min(MAX_SLIPPAGE_PCT);
    (pct.is_finite() && pct > 0.0).then_some(pct)
}

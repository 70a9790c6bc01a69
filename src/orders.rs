use serde::{Deserialize, Serialize};

/// Represents which side of the market an order is on.
///
/// # Intuition
/// - `Buy` (Bid): The trader wants to purchase the asset. A buy order consumes
///   liquidity from the **sell** side of the book.
/// - `Sell` (Ask): The trader wants to sell the asset. A sell order consumes
///   liquidity from the **buy** side of the book.
///
/// The estimator always looks at the opposing side: a buy fills against asks
/// at or below its limit, a sell fills against bids at or above its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,  // Bid
    Sell, // Ask
}

impl Side {
    /// The side of the book this order takes liquidity from.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Specifies how an order executes.
///
/// - `Limit`: Executes at a specific price or better
/// - `Market`: Executes immediately at the best available price
/// - `Advanced`: Stop/trigger variants; once armed they rest like limit orders,
///   so fill-time estimation treats them the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Advanced,
}

/// The order whose fill time is being estimated.
///
/// - `price` is the limit price; it is ignored for market orders
/// - `size` is the quantity in base units and must be positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub side: Side,
    pub order_type: OrderType,
    pub price: f64,
    pub size: f64,
}

//! Domain errors

use thiserror::Error;

/// Reasons an order book cannot be turned into a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Non-positive price {price} on {side} side")]
    NonPositivePrice { side: &'static str, price: String },

    #[error("Negative size {size} at price {price} on {side} side")]
    NegativeSize {
        side: &'static str,
        price: String,
        size: String,
    },

    #[error("Duplicate price level {price} on {side} side")]
    DuplicateLevel { side: &'static str, price: String },

    #[error("Bids are not strictly descending at index {index}")]
    BidsNotDescending { index: usize },

    #[error("Asks are not strictly ascending at index {index}")]
    AsksNotAscending { index: usize },

    #[error("Crossed book: best bid {best_bid} >= best ask {best_ask}")]
    Crossed { best_bid: String, best_ask: String },
}

/// Reasons a set of simulation parameters is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Quantity must be positive and finite, got {0}")]
    InvalidQuantity(f64),

    #[error("Volatility must be in (0, {max}], got {value}")]
    VolatilityOutOfRange { value: f64, max: f64 },

    #[error("Unknown fee tier: {0}")]
    UnknownFeeTier(String),

    #[error("Unsupported order type: {0}")]
    UnsupportedOrderType(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

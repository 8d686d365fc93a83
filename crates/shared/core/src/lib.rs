//! tcsim Core Domain
//!
//! Pure domain types for the tcsim transaction-cost engine.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! - [`OrderBookSnapshot`]: immutable, validated view of one book tick
//! - [`SimulationParameters`]: what the caller wants to trade
//! - [`CostEstimate`]: what it is expected to cost
//! - [`ConnectionState`]: lifecycle of the feed connection

pub mod entities;
pub mod error;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    ConnectionState,
    // Estimation output
    CostEstimate,
    // Fee types
    FeeTier,
    Liquidity,
    // Book model
    OrderBookSnapshot,
    OrderType,
    ParameterLimits,
    PriceLevel,
    // Inputs
    SimulationParameters,
};
pub use error::{BookError, ParameterError};
pub use values::{Price, Quantity, Symbol, Timestamp};

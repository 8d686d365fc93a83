mod connection;
mod estimate;
mod fee;
mod order_book;
mod order_type;
mod parameters;
mod price_level;

pub use connection::ConnectionState;
pub use estimate::{CostEstimate, Liquidity};
pub use fee::FeeTier;
pub use order_book::OrderBookSnapshot;
pub use order_type::OrderType;
pub use parameters::{ParameterLimits, SimulationParameters};
pub use price_level::PriceLevel;

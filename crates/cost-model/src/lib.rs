//! tcsim Cost Model
//!
//! Pure estimation layer. Nothing in this crate blocks, suspends, or
//! performs I/O.
//!
//! ```text
//! OrderBookSnapshot + quantity
//!         │
//!    ┌────▼──────────┐
//!    │ DepthEstimator│  band around mid, self-impact dampening
//!    └────┬──────────┘
//!         │ DepthEstimate
//!    ┌────▼──────────┐
//!    │   CostModel   │  slippage, fees, impact, maker/taker, net
//!    └────┬──────────┘
//!         │
//!    CostEstimate (timed by CostEstimator)
//! ```

pub mod depth;
pub mod estimator;
pub mod model;

pub use depth::{DepthConfig, DepthEstimate, DepthEstimator};
pub use estimator::CostEstimator;
pub use model::{CostBreakdown, CostModel, CostModelConfig};

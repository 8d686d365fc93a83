//! tcsim Engine - real-time transaction cost estimation
//!
//! Wires the feed gateway to the cost model:
//!
//! - **Config**: JSON configuration with embedded defaults
//! - **Orchestrator**: parameters + latest book → published estimates
//! - **Engine**: one ingestor and one orchestrator behind a single handle
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────┐     FeedEvent      ┌──────────────┐
//!   │ StreamIngestor  │ ─────────────────► │ Orchestrator │ ◄── set_parameters / start / stop
//!   │ (synthetic/ws)  │  (broadcast)       │              │
//!   └─────────────────┘                    └──────┬───────┘
//!                                                 │ CostEstimator (depth + cost model)
//!                                                 ▼
//!                                       broadcast Arc<CostEstimate>
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;

// Re-export main types
pub use config::{ConfigError, EngineConfig, FeedConfig, FeedMode};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use orchestrator::{EngineStatus, Orchestrator};

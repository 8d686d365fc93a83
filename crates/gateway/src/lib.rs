//! tcsim Gateway
//!
//! Feed layer for the cost engine. Provides:
//! - Wire message type for L2 order book ticks and its normalization
//! - Feed sources (synthetic generator, live WebSocket) behind one trait
//! - The `StreamIngestor` connection state machine with backoff reconnects
//!
//! ## Architecture
//!
//! ```text
//!  SyntheticSource / WebSocketSource
//!          │ raw JSON text
//!    ┌─────▼──────────┐
//!    │ StreamIngestor │  parse → validate → OrderBookSnapshot
//!    └─────┬──────────┘
//!          │ broadcast: FeedEvent { Opened, Snapshot, Closed, Error, Failed }
//!          │ watch:     ConnectionState
//!    ┌─────▼──────┐
//!    │Orchestrator│
//!    └────────────┘
//! ```

pub mod error;
pub mod ingestor;
pub mod messages;
pub mod reconnect;
pub mod source;

// Re-export commonly used types
pub use error::{GatewayError, Result};
pub use ingestor::{FeedEvent, IngestorConfig, StreamIngestor};
pub use messages::FeedMessage;
pub use reconnect::ReconnectPolicy;
pub use source::{
    FeedConnection, FeedSource,
    synthetic::{SyntheticConfig, SyntheticSource},
    websocket::WebSocketSource,
};

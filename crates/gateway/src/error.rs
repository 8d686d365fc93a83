//! Error types for the gateway crate

use tcsim_core::BookError;
use thiserror::Error;

/// Gateway-level errors (feed transport and message normalization)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("Invalid order book: {0}")]
    InvalidBook(#[from] BookError),

    #[error("Unexpected instrument {exchange}:{symbol}")]
    UnexpectedInstrument { exchange: String, symbol: String },

    #[error("No async runtime available")]
    NoRuntime,
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        GatewayError::WebSocket(Box::new(e))
    }
}

impl GatewayError {
    /// True for errors caused by message content rather than transport
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            GatewayError::Malformed(_)
                | GatewayError::InvalidNumber { .. }
                | GatewayError::InvalidTimestamp(_)
                | GatewayError::InvalidBook(_)
                | GatewayError::UnexpectedInstrument { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

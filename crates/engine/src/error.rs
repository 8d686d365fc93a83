//! Error types for the engine crate

use tcsim_core::ParameterError;
use tcsim_gateway::GatewayError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    #[error("No order book data available")]
    NoOrderBook,

    #[error("Feed error: {0}")]
    Feed(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

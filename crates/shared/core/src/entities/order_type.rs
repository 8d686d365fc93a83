use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParameterError;

/// Order types the engine can estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Execute immediately against the book
    #[default]
    Market,
}

impl FromStr for OrderType {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            other => Err(ParameterError::UnsupportedOrderType(other.to_string())),
        }
    }
}

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity};

/// Represents a single price level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub size: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price, size: Quantity) -> Self {
        PriceLevel { price, size }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_zero()
    }

    /// Price as f64 for the estimation models
    pub fn price_f64(&self) -> f64 {
        self.price.to_f64().unwrap_or(0.0)
    }

    /// Size as f64 for the estimation models
    pub fn size_f64(&self) -> f64 {
        self.size.to_f64().unwrap_or(0.0)
    }
}

impl From<(Price, Quantity)> for PriceLevel {
    fn from((price, size): (Price, Quantity)) -> Self {
        PriceLevel { price, size }
    }
}

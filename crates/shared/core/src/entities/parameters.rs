use serde::{Deserialize, Serialize};

use super::fee::FeeTier;
use super::order_type::OrderType;
use crate::error::ParameterError;

/// Bounds enforced when parameters are accepted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterLimits {
    /// Upper bound (inclusive) for volatility
    pub max_volatility: f64,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        ParameterLimits {
            max_volatility: 0.5,
        }
    }
}

/// Inputs for one cost estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub exchange: String,
    pub symbol: String,
    #[serde(default)]
    pub order_type: OrderType,
    /// Order size in quote notional
    pub quantity: f64,
    /// Volatility as a fraction (0.05 = 5%)
    pub volatility: f64,
    #[serde(default)]
    pub fee_tier: FeeTier,
}

impl SimulationParameters {
    pub fn new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        quantity: f64,
        volatility: f64,
        fee_tier: FeeTier,
    ) -> Self {
        SimulationParameters {
            exchange: exchange.into(),
            symbol: symbol.into(),
            order_type: OrderType::Market,
            quantity,
            volatility,
            fee_tier,
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_fee_tier(mut self, fee_tier: FeeTier) -> Self {
        self.fee_tier = fee_tier;
        self
    }

    /// Check the parameters against the configured limits
    pub fn validate(&self, limits: &ParameterLimits) -> Result<(), ParameterError> {
        if self.exchange.trim().is_empty() {
            return Err(ParameterError::Empty("exchange"));
        }
        if self.symbol.trim().is_empty() {
            return Err(ParameterError::Empty("symbol"));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(ParameterError::InvalidQuantity(self.quantity));
        }
        if !self.volatility.is_finite()
            || self.volatility <= 0.0
            || self.volatility > limits.max_volatility
        {
            return Err(ParameterError::VolatilityOutOfRange {
                value: self.volatility,
                max: limits.max_volatility,
            });
        }
        Ok(())
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters::new("OKX", "BTC-USDT-SWAP", 100.0, 0.05, FeeTier::Standard)
    }
}

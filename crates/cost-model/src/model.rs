//! Transaction Cost Model
//!
//! # Cost Components
//!
//! ```text
//! Net Cost = Slippage + Fees + Market Impact            (all in %)
//!
//! Slippage = Q / (D + ε) × σ × scale
//! Fees     = Q × rate(tier)                              (absolute)
//! Impact   = σ × |Q| × √(T / D) × 100                    (Almgren-Chriss style)
//! Maker    = clamp(1 − min(cap, Q / (10·D + 1)), floor, ceiling)
//! ```
//!
//! Where Q is order size, D the dampened liquidity depth, σ volatility and
//! T the time horizon. Fees enter net cost as `fees_abs / Q × 100`, i.e.
//! the fee rate in percent of notional.

use serde::{Deserialize, Serialize};
use tcsim_core::{FeeTier, Liquidity};

use crate::depth::DepthEstimate;

/// Value reported for market impact when depth is not positive
pub const IMPACT_SENTINEL: f64 = 0.0;

/// Cost model constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModelConfig {
    /// Added to depth in the slippage denominator
    #[serde(default = "default_slippage_epsilon")]
    pub slippage_epsilon: f64,
    /// Converts the relative size impact to percent
    #[serde(default = "default_slippage_scale")]
    pub slippage_scale: f64,
    /// Execution horizon for the impact model (1 = immediate)
    #[serde(default = "default_time_horizon")]
    pub time_horizon: f64,
    /// Largest taker share the maker/taker model will predict
    #[serde(default = "default_taker_cap")]
    pub taker_cap: f64,
    #[serde(default = "default_ratio_floor")]
    pub ratio_floor: f64,
    #[serde(default = "default_ratio_ceiling")]
    pub ratio_ceiling: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        CostModelConfig {
            slippage_epsilon: default_slippage_epsilon(),
            slippage_scale: default_slippage_scale(),
            time_horizon: default_time_horizon(),
            taker_cap: default_taker_cap(),
            ratio_floor: default_ratio_floor(),
            ratio_ceiling: default_ratio_ceiling(),
        }
    }
}

fn default_slippage_epsilon() -> f64 {
    1.0
}

fn default_slippage_scale() -> f64 {
    100.0
}

fn default_time_horizon() -> f64 {
    1.0
}

fn default_taker_cap() -> f64 {
    0.9
}

fn default_ratio_floor() -> f64 {
    0.1
}

fn default_ratio_ceiling() -> f64 {
    1.0
}

/// Cost components for one (parameters, depth) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub slippage_pct: f64,
    pub fees_abs: f64,
    pub fees_pct: f64,
    pub market_impact_pct: f64,
    pub net_cost_pct: f64,
    pub maker_taker_ratio: f64,
    pub liquidity: Liquidity,
}

/// Deterministic cost functions
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    config: CostModelConfig,
}

impl CostModel {
    pub fn new(config: CostModelConfig) -> Self {
        CostModel { config }
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    /// Expected slippage in percent
    pub fn slippage_pct(&self, quantity: f64, depth: f64, volatility: f64) -> f64 {
        let denominator = depth.max(0.0) + self.config.slippage_epsilon;
        if denominator <= 0.0 {
            return 0.0;
        }
        quantity / denominator * volatility * self.config.slippage_scale
    }

    /// Fees in quote currency, linear in quantity
    pub fn fees_abs(&self, quantity: f64, fee_tier: FeeTier) -> f64 {
        quantity * fee_tier.rate()
    }

    /// Fees as percent of the order notional
    pub fn fees_pct(&self, quantity: f64, fees_abs: f64) -> f64 {
        if quantity > 0.0 {
            fees_abs / quantity * 100.0
        } else {
            0.0
        }
    }

    /// Expected market impact in percent.
    ///
    /// Returns [`IMPACT_SENTINEL`] when depth is not positive.
    pub fn market_impact_pct(&self, quantity: f64, volatility: f64, depth: f64) -> f64 {
        if !depth.is_finite() || depth <= 0.0 {
            return IMPACT_SENTINEL;
        }
        volatility * quantity.abs() * (self.config.time_horizon / depth).sqrt() * 100.0
    }

    /// Predicted maker share of the fill
    pub fn maker_taker_ratio(&self, quantity: f64, depth: f64) -> f64 {
        let taker_share = (quantity / (depth.max(0.0) * 10.0 + 1.0)).min(self.config.taker_cap);
        (1.0 - taker_share).clamp(self.config.ratio_floor, self.config.ratio_ceiling)
    }

    /// All components for an order against a depth estimate
    pub fn breakdown(
        &self,
        quantity: f64,
        volatility: f64,
        fee_tier: FeeTier,
        depth: &DepthEstimate,
    ) -> CostBreakdown {
        let slippage_pct = self.slippage_pct(quantity, depth.depth, volatility);
        let fees_abs = self.fees_abs(quantity, fee_tier);
        let fees_pct = self.fees_pct(quantity, fees_abs);
        let market_impact_pct = self.market_impact_pct(quantity, volatility, depth.depth);

        CostBreakdown {
            slippage_pct,
            fees_abs,
            fees_pct,
            market_impact_pct,
            net_cost_pct: slippage_pct + fees_pct + market_impact_pct,
            maker_taker_ratio: self.maker_taker_ratio(quantity, depth.depth),
            liquidity: depth.liquidity,
        }
    }
}

//! Liquidity Depth Estimation
//!
//! Aggregates resting size inside a price band around mid, then dampens it
//! for the order's own footprint.
//!
//! ```text
//! threshold = base × (1 + log10(Q + 1) × sensitivity)
//! band      = [mid × (1 − threshold), mid × (1 + threshold)]
//! raw       = Σ ask sizes ≤ upper + Σ bid sizes ≥ lower
//! depth     = raw × (1 − min(cap, Q / raw))
//! ```
//!
//! Larger orders widen the band (they will walk further into the book) and
//! consume a larger share of what they find.

use serde::{Deserialize, Serialize};
use tcsim_core::{Liquidity, OrderBookSnapshot};

/// Depth model constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthConfig {
    /// Band half-width as a fraction of mid for a zero-size order
    #[serde(default = "default_base_threshold")]
    pub base_threshold: f64,
    /// How fast the band widens with log order size
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Maximum share of raw depth the order is assumed to consume
    #[serde(default = "default_damping_cap")]
    pub damping_cap: f64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        DepthConfig {
            base_threshold: default_base_threshold(),
            sensitivity: default_sensitivity(),
            damping_cap: default_damping_cap(),
        }
    }
}

fn default_base_threshold() -> f64 {
    0.01
}

fn default_sensitivity() -> f64 {
    0.1
}

fn default_damping_cap() -> f64 {
    0.5
}

/// Result of a depth computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthEstimate {
    /// Dampened depth, always >= 0
    pub depth: f64,
    /// Size inside the band before dampening
    pub raw_depth: f64,
    pub mid_price: Option<f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub liquidity: Liquidity,
}

impl DepthEstimate {
    fn insufficient(mid_price: Option<f64>, lower_bound: f64, upper_bound: f64) -> Self {
        DepthEstimate {
            depth: 0.0,
            raw_depth: 0.0,
            mid_price,
            lower_bound,
            upper_bound,
            liquidity: Liquidity::Insufficient,
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.liquidity == Liquidity::Sufficient
    }
}

/// Band-based depth estimator
#[derive(Debug, Clone, Default)]
pub struct DepthEstimator {
    config: DepthConfig,
}

impl DepthEstimator {
    pub fn new(config: DepthConfig) -> Self {
        DepthEstimator { config }
    }

    pub fn config(&self) -> &DepthConfig {
        &self.config
    }

    /// Band half-width (fraction of mid) for an order of `quantity`
    pub fn threshold(&self, quantity: f64) -> f64 {
        let quantity = quantity.max(0.0);
        self.config.base_threshold * (1.0 + (quantity + 1.0).log10() * self.config.sensitivity)
    }

    /// Estimate liquidity depth available to an order of `quantity`.
    ///
    /// A one-sided book or an empty band returns depth 0 flagged
    /// [`Liquidity::Insufficient`] instead of dividing by zero.
    pub fn estimate(&self, snapshot: &OrderBookSnapshot, quantity: f64) -> DepthEstimate {
        let quantity = quantity.max(0.0);

        let (Some(best_bid), Some(best_ask)) = (snapshot.best_bid(), snapshot.best_ask()) else {
            log::debug!(
                "{}:{} one-sided book, no mid price",
                snapshot.exchange_id(),
                snapshot.symbol()
            );
            return DepthEstimate::insufficient(None, 0.0, 0.0);
        };

        let mid = (best_bid.price_f64() + best_ask.price_f64()) / 2.0;
        let threshold = self.threshold(quantity);
        let lower_bound = mid * (1.0 - threshold);
        let upper_bound = mid * (1.0 + threshold);

        let ask_depth: f64 = snapshot
            .asks()
            .iter()
            .take_while(|level| level.price_f64() <= upper_bound)
            .map(|level| level.size_f64())
            .sum();

        let bid_depth: f64 = snapshot
            .bids()
            .iter()
            .take_while(|level| level.price_f64() >= lower_bound)
            .map(|level| level.size_f64())
            .sum();

        let raw_depth = ask_depth + bid_depth;
        if !raw_depth.is_finite() || raw_depth <= 0.0 {
            return DepthEstimate::insufficient(Some(mid), lower_bound, upper_bound);
        }

        let consumed = (quantity / raw_depth).min(self.config.damping_cap.clamp(0.0, 1.0));
        let depth = (raw_depth * (1.0 - consumed)).max(0.0);

        DepthEstimate {
            depth,
            raw_depth,
            mid_price: Some(mid),
            lower_bound,
            upper_bound,
            liquidity: Liquidity::Sufficient,
        }
    }
}

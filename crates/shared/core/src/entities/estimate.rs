use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Whether the book held enough liquidity to produce a meaningful estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Liquidity {
    #[default]
    Sufficient,
    /// No depth inside the band (or no two-sided book). Cost fields hold
    /// finite sentinels and must not be read as a normal estimate.
    Insufficient,
}

/// Expected cost of executing the current parameters against one snapshot.
///
/// All percentage fields are in percent (0.25 = 0.25%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Expected execution price deviation from mid
    pub slippage_pct: f64,
    /// Fees in quote currency
    pub fees_abs: f64,
    /// Fees on the same percentage basis as the other components
    pub fees_pct: f64,
    /// Expected permanent price displacement
    pub market_impact_pct: f64,
    /// slippage_pct + fees_pct + market_impact_pct
    pub net_cost_pct: f64,
    /// Predicted maker fraction, always in [0.1, 1.0]
    pub maker_taker_ratio: f64,
    /// Wall time spent computing this estimate
    pub compute_latency_ms: f64,
    /// Dampened depth the estimate was derived from
    pub liquidity_depth: f64,
    pub mid_price: Option<f64>,
    pub liquidity: Liquidity,
    /// Timestamp of the snapshot the estimate was computed from
    pub snapshot_time: Timestamp,
    /// Publication order, assigned by the orchestrator (0 = unpublished)
    #[serde(default)]
    pub sequence: u64,
}

impl CostEstimate {
    pub fn is_insufficient_liquidity(&self) -> bool {
        self.liquidity == Liquidity::Insufficient
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "Slippage: {:.4}% | Fees: {:.4} | Impact: {:.4}% | Net: {:.4}% | Maker: {:.2} | {:.3} ms",
            self.slippage_pct,
            self.fees_abs,
            self.market_impact_pct,
            self.net_cost_pct,
            self.maker_taker_ratio,
            self.compute_latency_ms
        )
    }
}

//! Timed composition of depth and cost models

use std::time::Instant;

use tcsim_core::{CostEstimate, OrderBookSnapshot, SimulationParameters};

use crate::depth::{DepthConfig, DepthEstimator};
use crate::model::{CostModel, CostModelConfig};

/// Produces a [`CostEstimate`] from a snapshot and parameters.
///
/// `compute_latency_ms` is measured with a monotonic clock around the whole
/// computation, depth included.
#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    depth: DepthEstimator,
    model: CostModel,
}

impl CostEstimator {
    pub fn new(depth: DepthConfig, model: CostModelConfig) -> Self {
        CostEstimator {
            depth: DepthEstimator::new(depth),
            model: CostModel::new(model),
        }
    }

    pub fn depth_estimator(&self) -> &DepthEstimator {
        &self.depth
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.model
    }

    pub fn estimate(
        &self,
        snapshot: &OrderBookSnapshot,
        params: &SimulationParameters,
    ) -> CostEstimate {
        let started = Instant::now();

        let depth = self.depth.estimate(snapshot, params.quantity);
        let costs = self
            .model
            .breakdown(params.quantity, params.volatility, params.fee_tier, &depth);

        if !depth.is_sufficient() {
            log::debug!(
                "{}:{} insufficient liquidity for quantity {}",
                snapshot.exchange_id(),
                snapshot.symbol(),
                params.quantity
            );
        }

        let compute_latency_ms = started.elapsed().as_secs_f64() * 1_000.0;

        CostEstimate {
            slippage_pct: costs.slippage_pct,
            fees_abs: costs.fees_abs,
            fees_pct: costs.fees_pct,
            market_impact_pct: costs.market_impact_pct,
            net_cost_pct: costs.net_cost_pct,
            maker_taker_ratio: costs.maker_taker_ratio,
            compute_latency_ms,
            liquidity_depth: depth.depth,
            mid_price: depth.mid_price,
            liquidity: costs.liquidity,
            snapshot_time: snapshot.timestamp(),
            sequence: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tcsim_core::{FeeTier, Liquidity, PriceLevel};

    fn two_level_book() -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            Utc::now(),
            "OKX",
            "BTC-USDT-SWAP",
            vec![PriceLevel::new(dec!(100), dec!(10))],
            vec![PriceLevel::new(dec!(101), dec!(10))],
        )
        .unwrap()
    }

    #[test]
    fn test_estimate_end_to_end() {
        let estimator = CostEstimator::default();
        let params = SimulationParameters::default()
            .with_quantity(10.0)
            .with_volatility(0.05);

        let estimate = estimator.estimate(&two_level_book(), &params);

        // depth = 20 × (1 − 0.5) = 10
        assert_relative_eq!(estimate.liquidity_depth, 10.0);
        assert_relative_eq!(estimate.slippage_pct, 10.0 / 11.0 * 0.05 * 100.0);
        assert_relative_eq!(estimate.fees_abs, 0.01, epsilon = 1e-12);
        assert_relative_eq!(
            estimate.market_impact_pct,
            0.05 * 10.0 * (0.1f64).sqrt() * 100.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            estimate.net_cost_pct,
            estimate.slippage_pct + estimate.fees_pct + estimate.market_impact_pct
        );
        assert_eq!(estimate.mid_price, Some(100.5));
        assert_eq!(estimate.liquidity, Liquidity::Sufficient);
        assert!(estimate.compute_latency_ms >= 0.0);
        assert_eq!(estimate.sequence, 0);
    }

    #[test]
    fn test_fees_independent_of_depth_and_volatility() {
        let estimator = CostEstimator::default();
        let params = SimulationParameters::default()
            .with_quantity(100.0)
            .with_fee_tier(FeeTier::Standard);

        let thin = OrderBookSnapshot::new(
            Utc::now(),
            "OKX",
            "BTC-USDT-SWAP",
            vec![PriceLevel::new(dec!(100), dec!(0.5))],
            vec![PriceLevel::new(dec!(101), dec!(0.5))],
        )
        .unwrap();

        let a = estimator.estimate(&two_level_book(), &params);
        let b = estimator.estimate(&thin, &params.clone().with_volatility(0.3));
        assert_eq!(a.fees_abs, 0.1);
        assert_eq!(b.fees_abs, 0.1);
    }

    #[test]
    fn test_insufficient_liquidity_flagged() {
        let empty = OrderBookSnapshot::new(Utc::now(), "OKX", "BTC-USDT-SWAP", vec![], vec![])
            .unwrap();
        let estimate = CostEstimator::default().estimate(&empty, &SimulationParameters::default());

        assert!(estimate.is_insufficient_liquidity());
        assert_eq!(estimate.liquidity_depth, 0.0);
        assert!(estimate.net_cost_pct.is_finite());
        assert!((0.1..=1.0).contains(&estimate.maker_taker_ratio));
    }
}

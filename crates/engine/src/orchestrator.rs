//! Orchestrator
//!
//! Holds the current parameters, the latest snapshot and the latest estimate,
//! and decides when to recompute.
//!
//! ```text
//!  FeedEvent::Snapshot ──► on_snapshot ──┐
//!  set_parameters ───────────────────────┼──► recompute (if active) ──► broadcast Arc<CostEstimate>
//!  start ────────────────────────────────┘
//! ```
//!
//! Recomputation and publication happen while holding the state lock, so
//! estimates are published in the same order as the inputs that caused them
//! and every input produces at most one estimate.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use tcsim_core::{
    CostEstimate, OrderBookSnapshot, ParameterLimits, SimulationParameters, Timestamp,
};
use tcsim_cost_model::CostEstimator;
use tcsim_gateway::FeedEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::error::{EngineError, Result};

/// Point-in-time view of the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub active: bool,
    pub has_order_book: bool,
    /// Local receipt time of the latest snapshot
    pub last_update: Option<Timestamp>,
    pub seconds_since_update: Option<f64>,
}

struct OrchestratorState {
    parameters: SimulationParameters,
    snapshot: Option<Arc<OrderBookSnapshot>>,
    estimate: Option<Arc<CostEstimate>>,
    active: bool,
    last_update: Option<Timestamp>,
    sequence: u64,
}

pub struct Orchestrator {
    estimator: CostEstimator,
    limits: ParameterLimits,
    state: Mutex<OrchestratorState>,
    estimates: broadcast::Sender<Arc<CostEstimate>>,
}

impl Orchestrator {
    /// Create an inactive orchestrator. Rejects invalid initial parameters.
    pub fn new(
        estimator: CostEstimator,
        limits: ParameterLimits,
        parameters: SimulationParameters,
        capacity: usize,
    ) -> Result<Self> {
        parameters.validate(&limits)?;
        let (estimates, _) = broadcast::channel(capacity.max(1));

        Ok(Orchestrator {
            estimator,
            limits,
            state: Mutex::new(OrchestratorState {
                parameters,
                snapshot: None,
                estimate: None,
                active: false,
                last_update: None,
                sequence: 0,
            }),
            estimates,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CostEstimate>> {
        self.estimates.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    pub fn parameters(&self) -> SimulationParameters {
        self.state.lock().parameters.clone()
    }

    pub fn limits(&self) -> &ParameterLimits {
        &self.limits
    }

    /// Last published estimate; stays readable after `stop()`
    pub fn latest_estimate(&self) -> Option<Arc<CostEstimate>> {
        self.state.lock().estimate.clone()
    }

    pub fn latest_snapshot(&self) -> Option<Arc<OrderBookSnapshot>> {
        self.state.lock().snapshot.clone()
    }

    /// Replace the parameters and recompute when active.
    ///
    /// Invalid parameters are rejected and the previous ones stay in effect.
    pub fn set_parameters(
        &self,
        parameters: SimulationParameters,
    ) -> Result<Option<Arc<CostEstimate>>> {
        if let Err(e) = parameters.validate(&self.limits) {
            warn!("rejected parameters: {}", e);
            return Err(e.into());
        }

        let mut state = self.state.lock();
        debug!(
            "parameters: {} {} qty={} vol={} tier={}",
            parameters.exchange,
            parameters.symbol,
            parameters.quantity,
            parameters.volatility,
            parameters.fee_tier
        );
        state.parameters = parameters;
        Ok(self.recompute(&mut state))
    }

    /// Store a new snapshot and recompute when active
    pub fn on_snapshot(&self, snapshot: Arc<OrderBookSnapshot>) -> Option<Arc<CostEstimate>> {
        let mut state = self.state.lock();
        state.snapshot = Some(snapshot);
        state.last_update = Some(Utc::now());
        self.recompute(&mut state)
    }

    /// Enable estimation. Recomputes right away if a snapshot is held.
    pub fn start(&self) -> Option<Arc<CostEstimate>> {
        let mut state = self.state.lock();
        if state.active {
            return None;
        }
        state.active = true;
        info!("estimation started");
        self.recompute(&mut state)
    }

    /// Disable estimation; the last estimate stays visible
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if state.active {
            state.active = false;
            info!("estimation stopped");
        }
    }

    /// One-off estimate for `parameters` against the held snapshot.
    ///
    /// Does not touch state and publishes nothing.
    pub fn simulate(&self, parameters: &SimulationParameters) -> Result<CostEstimate> {
        parameters.validate(&self.limits)?;
        let snapshot = self.latest_snapshot().ok_or(EngineError::NoOrderBook)?;
        Ok(self.estimator.estimate(&snapshot, parameters))
    }

    pub fn status(&self) -> EngineStatus {
        let state = self.state.lock();
        let seconds_since_update = state
            .last_update
            .map(|at| (Utc::now() - at).num_milliseconds().max(0) as f64 / 1_000.0);

        EngineStatus {
            active: state.active,
            has_order_book: state.snapshot.is_some(),
            last_update: state.last_update,
            seconds_since_update,
        }
    }

    /// Feed snapshots from `events` into [`Orchestrator::on_snapshot`].
    ///
    /// The task ends when the event channel closes. A lagging receiver skips
    /// the snapshots it missed; only the newest book matters.
    pub fn attach(self: &Arc<Self>, mut events: broadcast::Receiver<FeedEvent>) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(FeedEvent::Snapshot(snapshot)) => {
                        orchestrator.on_snapshot(snapshot);
                    }
                    Ok(FeedEvent::Failed { attempts }) => {
                        warn!("feed failed after {} attempts, estimates will go stale", attempts);
                    }
                    Ok(event) => debug!("feed event: {:?}", event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("orchestrator lagged, skipped {} feed events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("feed event stream closed");
        })
    }

    fn recompute(&self, state: &mut OrchestratorState) -> Option<Arc<CostEstimate>> {
        if !state.active {
            return None;
        }
        let snapshot = state.snapshot.as_ref()?;

        let mut estimate = self.estimator.estimate(snapshot, &state.parameters);
        state.sequence += 1;
        estimate.sequence = state.sequence;

        if estimate.is_insufficient_liquidity() {
            warn!(
                "#{} insufficient liquidity for quantity {}",
                estimate.sequence, state.parameters.quantity
            );
        }

        let estimate = Arc::new(estimate);
        state.estimate = Some(Arc::clone(&estimate));
        // No subscribers is fine, the estimate is still readable
        let _ = self.estimates.send(Arc::clone(&estimate));
        Some(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;
    use tcsim_core::{FeeTier, PriceLevel};
    use tokio::sync::broadcast::error::TryRecvError;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            CostEstimator::default(),
            ParameterLimits::default(),
            SimulationParameters::default(),
            16,
        )
        .unwrap()
    }

    fn book(best_bid: rust_decimal::Decimal) -> Arc<OrderBookSnapshot> {
        Arc::new(
            OrderBookSnapshot::new(
                Utc::now(),
                "OKX",
                "BTC-USDT-SWAP",
                vec![PriceLevel::new(best_bid, dec!(500))],
                vec![PriceLevel::new(best_bid + dec!(1), dec!(500))],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_inactive_stores_without_publishing() {
        let orchestrator = orchestrator();
        let mut rx = orchestrator.subscribe();

        assert!(orchestrator.on_snapshot(book(dec!(100))).is_none());
        assert!(orchestrator.latest_snapshot().is_some());
        assert!(orchestrator.latest_estimate().is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_start_recomputes_held_snapshot() {
        let orchestrator = orchestrator();
        let mut rx = orchestrator.subscribe();
        orchestrator.on_snapshot(book(dec!(100)));

        let estimate = orchestrator.start().unwrap();
        assert_eq!(estimate.sequence, 1);
        assert_eq!(rx.try_recv().unwrap().sequence, 1);

        // Second start is a no-op
        assert!(orchestrator.start().is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_start_without_snapshot_publishes_nothing() {
        let orchestrator = orchestrator();
        assert!(orchestrator.start().is_none());
        assert!(orchestrator.is_active());
        assert!(orchestrator.latest_estimate().is_none());
    }

    #[test]
    fn test_one_estimate_per_snapshot_in_order() {
        let orchestrator = orchestrator();
        let mut rx = orchestrator.subscribe();
        orchestrator.start();

        let ticks = [(dec!(100), 100.5), (dec!(101), 101.5), (dec!(102), 102.5)];
        for (i, (bid, mid)) in ticks.into_iter().enumerate() {
            orchestrator.on_snapshot(book(bid));
            let estimate = rx.try_recv().unwrap();
            assert_eq!(estimate.sequence, i as u64 + 1);
            assert_eq!(estimate.mid_price, Some(mid));
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_set_parameters_recomputes_when_active() {
        let orchestrator = orchestrator();
        let mut rx = orchestrator.subscribe();
        orchestrator.on_snapshot(book(dec!(100)));
        orchestrator.start();
        rx.try_recv().unwrap();

        let params = SimulationParameters::default().with_fee_tier(FeeTier::Tier3);
        let estimate = orchestrator.set_parameters(params).unwrap().unwrap();
        assert_relative_eq!(estimate.fees_abs, 0.04, epsilon = 1e-12);
        assert_eq!(rx.try_recv().unwrap().sequence, 2);
    }

    #[test]
    fn test_invalid_parameters_keep_previous() {
        let orchestrator = orchestrator();
        let before = orchestrator.parameters();

        let err = orchestrator
            .set_parameters(SimulationParameters::default().with_quantity(-1.0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameters(_)));
        assert_eq!(orchestrator.parameters(), before);

        let err = orchestrator
            .set_parameters(SimulationParameters::default().with_volatility(0.9))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameters(_)));
        assert_eq!(orchestrator.parameters(), before);
    }

    #[test]
    fn test_stop_keeps_last_estimate() {
        let orchestrator = orchestrator();
        let mut rx = orchestrator.subscribe();
        orchestrator.on_snapshot(book(dec!(100)));
        orchestrator.start();
        rx.try_recv().unwrap();

        orchestrator.stop();
        assert!(orchestrator.on_snapshot(book(dec!(105))).is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        let kept = orchestrator.latest_estimate().unwrap();
        assert_eq!(kept.sequence, 1);
        assert_eq!(kept.mid_price, Some(100.5));
    }

    #[test]
    fn test_simulate_is_side_effect_free() {
        let orchestrator = orchestrator();
        assert!(matches!(
            orchestrator.simulate(&SimulationParameters::default()),
            Err(EngineError::NoOrderBook)
        ));

        let mut rx = orchestrator.subscribe();
        orchestrator.on_snapshot(book(dec!(100)));
        let what_if = SimulationParameters::default().with_quantity(1_000.0);
        let estimate = orchestrator.simulate(&what_if).unwrap();

        assert_relative_eq!(estimate.fees_abs, 1.0, epsilon = 1e-12);
        assert_eq!(estimate.sequence, 0);
        assert_eq!(orchestrator.parameters(), SimulationParameters::default());
        assert!(orchestrator.latest_estimate().is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_status() {
        let orchestrator = orchestrator();
        let status = orchestrator.status();
        assert!(!status.active);
        assert!(!status.has_order_book);
        assert!(status.last_update.is_none());
        assert!(status.seconds_since_update.is_none());

        orchestrator.on_snapshot(book(dec!(100)));
        orchestrator.start();
        let status = orchestrator.status();
        assert!(status.active);
        assert!(status.has_order_book);
        assert!(status.seconds_since_update.unwrap() >= 0.0);
    }

    #[test]
    fn test_invalid_initial_parameters() {
        let result = Orchestrator::new(
            CostEstimator::default(),
            ParameterLimits::default(),
            SimulationParameters::default().with_quantity(0.0),
            16,
        );
        assert!(matches!(result, Err(EngineError::InvalidParameters(_))));
    }
}

//! Synthetic order book feed
//!
//! Emits one five-level book per interval around a base price that jitters
//! by ±50 each tick. Bids carry one very large resting order at the touch,
//! asks are spread across fixed offsets:
//!
//! ```text
//! asks  base+0.1  base+2.5  base+5  base+10  base+15
//! bids  base      base-0.1  base-5  base-10  base-15
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Interval, MissedTickBehavior};

use super::{FeedConnection, FeedSource};
use crate::error::Result;
use crate::messages::FeedMessage;

/// (price offset, min size, size range)
const ASK_LEVELS: [(f64, f64, f64); 5] = [
    (0.1, 5.0, 10.0),
    (2.5, 1.0, 5.0),
    (5.0, 2.0, 10.0),
    (10.0, 5.0, 15.0),
    (15.0, 10.0, 20.0),
];

const BID_LEVELS: [(f64, f64, f64); 5] = [
    (0.0, 500.0, 1500.0),
    (-0.1, 0.01, 5.0),
    (-5.0, 2.0, 10.0),
    (-10.0, 5.0, 15.0),
    (-15.0, 10.0, 20.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub exchange: String,
    pub symbol: String,
    pub base_price: f64,
    /// Maximum absolute jitter applied to the base price per tick
    pub jitter: f64,
    pub interval: Duration,
    /// Fixed seed for reproducible books; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            exchange: "OKX".to_string(),
            symbol: "BTC-USDT-SWAP".to_string(),
            base_price: 95_400.0,
            jitter: 50.0,
            interval: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// In-process feed that never fails to connect
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        SyntheticSource { config }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }
}

#[async_trait]
impl FeedSource for SyntheticSource {
    async fn open(&self) -> Result<Box<dyn FeedConnection>> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut interval = tokio::time::interval(self.config.interval.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Box::new(SyntheticConnection {
            config: self.config.clone(),
            rng,
            interval,
        }))
    }

    fn describe(&self) -> String {
        format!(
            "synthetic://{}/{} every {:?}",
            self.config.exchange, self.config.symbol, self.config.interval
        )
    }
}

struct SyntheticConnection {
    config: SyntheticConfig,
    rng: StdRng,
    interval: Interval,
}

impl SyntheticConnection {
    fn next_book(&mut self) -> FeedMessage {
        let jitter = self.config.jitter.abs();
        let base = if jitter > 0.0 {
            self.config.base_price + self.rng.gen_range(-jitter..jitter)
        } else {
            self.config.base_price
        };
        // Keep prices on a 0.1 tick so offsets never collide
        let base = (base * 10.0).round() / 10.0;

        let asks = ASK_LEVELS
            .iter()
            .map(|&(offset, min, range)| self.level(base + offset, min, range))
            .collect();
        let bids = BID_LEVELS
            .iter()
            .map(|&(offset, min, range)| self.level(base + offset, min, range))
            .collect();

        FeedMessage {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            exchange: self.config.exchange.clone(),
            symbol: self.config.symbol.clone(),
            asks,
            bids,
        }
    }

    fn level(&mut self, price: f64, min_size: f64, size_range: f64) -> [String; 2] {
        let size = min_size + self.rng.r#gen::<f64>() * size_range;
        [format!("{price:.1}"), format!("{size:.4}")]
    }
}

#[async_trait]
impl FeedConnection for SyntheticConnection {
    async fn next_message(&mut self) -> Option<Result<String>> {
        self.interval.tick().await;
        Some(self.next_book().to_json())
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tcsim_core::{ParameterLimits, SimulationParameters};
use tcsim_cost_model::{CostModelConfig, DepthConfig};
use tcsim_gateway::{IngestorConfig, ReconnectPolicy, SyntheticConfig};

/// Where order book ticks come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// In-process generated books
    #[default]
    Synthetic,
    /// Live L2 feed over WebSocket
    Websocket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub mode: FeedMode,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_synthetic_interval_ms")]
    pub synthetic_interval_ms: u64,
    #[serde(default)]
    pub synthetic_seed: Option<u64>,
    #[serde(default = "default_synthetic_base_price")]
    pub synthetic_base_price: f64,
    /// Broadcast buffer between ingestor and orchestrator
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            mode: FeedMode::default(),
            exchange: default_exchange(),
            symbol: default_symbol(),
            ws_url: default_ws_url(),
            synthetic_interval_ms: default_synthetic_interval_ms(),
            synthetic_seed: None,
            synthetic_base_price: default_synthetic_base_price(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_exchange() -> String {
    "OKX".to_string()
}

fn default_symbol() -> String {
    "BTC-USDT-SWAP".to_string()
}

fn default_ws_url() -> String {
    "wss://ws.gomarket-cpp.goquant.io/ws/l2-orderbook/okx/BTC-USDT-SWAP".to_string()
}

fn default_synthetic_interval_ms() -> u64 {
    1000
}

fn default_synthetic_base_price() -> f64 {
    95_400.0
}

fn default_event_capacity() -> usize {
    1024
}

fn default_estimate_capacity() -> usize {
    256
}

impl FeedConfig {
    pub fn ingestor_config(&self, reconnect: ReconnectPolicy) -> IngestorConfig {
        IngestorConfig {
            exchange: self.exchange.clone(),
            symbol: self.symbol.clone(),
            reconnect,
            event_capacity: self.event_capacity,
        }
    }

    pub fn synthetic_config(&self) -> SyntheticConfig {
        SyntheticConfig {
            exchange: self.exchange.clone(),
            symbol: self.symbol.clone(),
            base_price: self.synthetic_base_price,
            interval: Duration::from_millis(self.synthetic_interval_ms),
            seed: self.synthetic_seed,
            ..Default::default()
        }
    }
}

/// Top-level engine configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    #[serde(default)]
    pub depth: DepthConfig,
    #[serde(default)]
    pub cost: CostModelConfig,
    #[serde(default)]
    pub limits: ParameterLimits,
    /// Parameters in effect before the first `set_parameters`
    #[serde(default)]
    pub defaults: SimulationParameters,
    /// Broadcast buffer for published estimates
    #[serde(default = "default_estimate_capacity")]
    pub estimate_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            feed: FeedConfig::default(),
            reconnect: ReconnectPolicy::default(),
            depth: DepthConfig::default(),
            cost: CostModelConfig::default(),
            limits: ParameterLimits::default(),
            defaults: SimulationParameters::default(),
            estimate_capacity: default_estimate_capacity(),
        }
    }
}

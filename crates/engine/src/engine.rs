//! Engine facade
//!
//! One [`StreamIngestor`] feeding one [`Orchestrator`]. Each engine owns its
//! own feed connection and channels, so several can run side by side.

use std::sync::Arc;

use log::info;
use parking_lot::Mutex;
use tcsim_core::{ConnectionState, CostEstimate, SimulationParameters};
use tcsim_cost_model::CostEstimator;
use tcsim_gateway::{
    FeedEvent, FeedSource, GatewayError, StreamIngestor, SyntheticSource, WebSocketSource,
};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::{EngineConfig, FeedConfig, FeedMode};
use crate::error::Result;
use crate::orchestrator::{EngineStatus, Orchestrator};

pub struct Engine {
    config: EngineConfig,
    ingestor: StreamIngestor,
    orchestrator: Arc<Orchestrator>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Build an engine with the feed source selected by `config.feed.mode`
    pub fn new(config: EngineConfig) -> Result<Self> {
        let source = build_source(&config.feed);
        Self::with_source(config, source)
    }

    /// Build an engine around an explicit feed source
    pub fn with_source(config: EngineConfig, source: Arc<dyn FeedSource>) -> Result<Self> {
        config.validate()?;

        let estimator = CostEstimator::new(config.depth, config.cost);
        let orchestrator = Orchestrator::new(
            estimator,
            config.limits,
            config.defaults.clone(),
            config.estimate_capacity,
        )?;
        let ingestor = StreamIngestor::new(config.feed.ingestor_config(config.reconnect), source);

        Ok(Engine {
            config,
            ingestor,
            orchestrator: Arc::new(orchestrator),
            consumer: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Open the feed. Snapshots flow into the orchestrator from here on.
    pub fn connect(&self) -> Result<()> {
        Handle::try_current().map_err(|_| GatewayError::NoRuntime)?;
        {
            let mut consumer = self.consumer.lock();
            let attached = consumer.as_ref().is_some_and(|task| !task.is_finished());
            if !attached {
                *consumer = Some(self.orchestrator.attach(self.ingestor.subscribe()));
            }
        }
        self.ingestor.connect()?;
        Ok(())
    }

    pub fn disconnect(&self) {
        self.ingestor.disconnect();
    }

    pub fn start(&self) -> Option<Arc<CostEstimate>> {
        self.orchestrator.start()
    }

    pub fn stop(&self) {
        self.orchestrator.stop();
    }

    pub fn is_active(&self) -> bool {
        self.orchestrator.is_active()
    }

    pub fn parameters(&self) -> SimulationParameters {
        self.orchestrator.parameters()
    }

    pub fn set_parameters(
        &self,
        parameters: SimulationParameters,
    ) -> Result<Option<Arc<CostEstimate>>> {
        self.orchestrator.set_parameters(parameters)
    }

    pub fn simulate(&self, parameters: &SimulationParameters) -> Result<CostEstimate> {
        self.orchestrator.simulate(parameters)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CostEstimate>> {
        self.orchestrator.subscribe()
    }

    pub fn feed_events(&self) -> broadcast::Receiver<FeedEvent> {
        self.ingestor.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.ingestor.state()
    }

    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.ingestor.watch_state()
    }

    pub fn status(&self) -> EngineStatus {
        self.orchestrator.status()
    }

    pub fn latest_estimate(&self) -> Option<Arc<CostEstimate>> {
        self.orchestrator.latest_estimate()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(task) = self.consumer.lock().take() {
            task.abort();
        }
    }
}

fn build_source(feed: &FeedConfig) -> Arc<dyn FeedSource> {
    match feed.mode {
        FeedMode::Synthetic => {
            info!("using synthetic feed for {}:{}", feed.exchange, feed.symbol);
            Arc::new(SyntheticSource::new(feed.synthetic_config()))
        }
        FeedMode::Websocket => {
            info!("using websocket feed {}", feed.ws_url);
            Arc::new(WebSocketSource::new(feed.ws_url.clone()))
        }
    }
}

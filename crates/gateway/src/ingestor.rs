//! Stream Ingestor
//!
//! Owns one logical subscription to an (exchange, symbol) feed and turns raw
//! frames into validated [`OrderBookSnapshot`]s.
//!
//! ## State machine
//!
//! ```text
//!  Disconnected ──connect()──► Connecting ──open ok──► Connected
//!        ▲                         │                      │ drop / error
//!        │                         └──open failed──┐      ▼
//!        │                                         └─► Reconnecting ──ok──► Connected
//!        │                                                │
//!        │                                   attempts > max_attempts
//!        │                                                ▼
//!        └──────────────── disconnect() (any state) ◄── Failed ──connect()──► Connecting
//! ```
//!
//! A session runs as one spawned task. Every state write and event it makes
//! is checked against the session generation, which `disconnect()` bumps, so
//! a torn-down session can never publish.

use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tcsim_core::{ConnectionState, OrderBookSnapshot};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::{GatewayError, Result};
use crate::messages::FeedMessage;
use crate::reconnect::ReconnectPolicy;
use crate::source::{FeedConnection, FeedSource};

/// Events published by the ingestor, in order
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A connection was established
    Opened,
    Snapshot(Arc<OrderBookSnapshot>),
    /// A live connection ended
    Closed,
    /// Transport error (connect failure or error on an open stream)
    Error(String),
    /// Reconnect attempts exhausted
    Failed { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestorConfig {
    pub exchange: String,
    pub symbol: String,
    pub reconnect: ReconnectPolicy,
    /// Broadcast buffer for feed events
    pub event_capacity: usize,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        IngestorConfig {
            exchange: "OKX".to_string(),
            symbol: "BTC-USDT-SWAP".to_string(),
            reconnect: ReconnectPolicy::default(),
            event_capacity: 1024,
        }
    }
}

struct Session {
    generation: u64,
    state: ConnectionState,
    /// Set while a connection is open, cleared when its close is reported
    live: bool,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    session: Mutex<Session>,
    state_tx: watch::Sender<ConnectionState>,
    events: broadcast::Sender<FeedEvent>,
}

impl Shared {
    /// Run `f` under the lock if `generation` is still the current session
    fn with_current<R>(&self, generation: u64, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut session = self.session.lock();
        if session.generation != generation {
            return None;
        }
        Some(f(&mut session))
    }

    fn set_state(&self, session: &mut Session, state: ConnectionState) {
        if session.state != state {
            debug!("connection state {} -> {}", session.state, state);
        }
        session.state = state;
        self.state_tx.send_replace(state);
    }

    fn publish(&self, event: FeedEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

/// Connection state machine around a [`FeedSource`]
pub struct StreamIngestor {
    config: IngestorConfig,
    source: Arc<dyn FeedSource>,
    shared: Arc<Shared>,
}

impl StreamIngestor {
    pub fn new(config: IngestorConfig, source: Arc<dyn FeedSource>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        StreamIngestor {
            config,
            source,
            shared: Arc::new(Shared {
                session: Mutex::new(Session {
                    generation: 0,
                    state: ConnectionState::Disconnected,
                    live: false,
                    task: None,
                }),
                state_tx,
                events,
            }),
        }
    }

    pub fn config(&self) -> &IngestorConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.session.lock().state
    }

    /// Receiver that observes every state change
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.shared.events.subscribe()
    }

    /// Start a session.
    ///
    /// No-op while a session is already active (connecting, connected or
    /// reconnecting). From `Disconnected` or `Failed` a fresh session starts
    /// with a reset attempt counter. Must be called inside a tokio runtime.
    pub fn connect(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| GatewayError::NoRuntime)?;

        let mut session = self.shared.session.lock();
        if session.state.is_active() {
            debug!("connect() ignored, session already {}", session.state);
            return Ok(());
        }

        session.generation += 1;
        session.live = false;
        let generation = session.generation;
        self.shared.set_state(&mut session, ConnectionState::Connecting);
        info!("connecting to {}", self.source.describe());

        let task = runtime.spawn(run_session(
            self.shared.clone(),
            self.source.clone(),
            self.config.clone(),
            generation,
        ));
        session.task = Some(task);
        Ok(())
    }

    /// Tear down the session and cancel any pending reconnect.
    ///
    /// Idempotent. Emits [`FeedEvent::Closed`] only if a connection was open.
    pub fn disconnect(&self) {
        let mut session = self.shared.session.lock();
        if session.state == ConnectionState::Disconnected && session.task.is_none() {
            return;
        }

        session.generation += 1;
        if let Some(task) = session.task.take() {
            task.abort();
        }
        let was_live = std::mem::take(&mut session.live);
        self.shared.set_state(&mut session, ConnectionState::Disconnected);
        if was_live {
            self.shared.publish(FeedEvent::Closed);
        }
        info!("disconnected from {}", self.source.describe());
    }
}

impl Drop for StreamIngestor {
    fn drop(&mut self) {
        let mut session = self.shared.session.lock();
        session.generation += 1;
        if let Some(task) = session.task.take() {
            task.abort();
        }
    }
}

async fn run_session(
    shared: Arc<Shared>,
    source: Arc<dyn FeedSource>,
    config: IngestorConfig,
    generation: u64,
) {
    let policy = config.reconnect;
    let mut attempt: u32 = 0;

    loop {
        match source.open().await {
            Ok(mut connection) => {
                attempt = 0;
                let opened = shared.with_current(generation, |session| {
                    session.live = true;
                    shared.set_state(session, ConnectionState::Connected);
                    shared.publish(FeedEvent::Opened);
                });
                if opened.is_none() {
                    connection.close().await;
                    return;
                }
                info!("connected to {}", source.describe());

                if !pump(&shared, &config, generation, connection.as_mut()).await {
                    connection.close().await;
                    return;
                }

                let current = shared.with_current(generation, |session| {
                    if std::mem::take(&mut session.live) {
                        shared.publish(FeedEvent::Closed);
                    }
                });
                if current.is_none() {
                    return;
                }
            }
            Err(e) => {
                warn!("connection to {} failed: {}", source.describe(), e);
                let message = e.to_string();
                if shared
                    .with_current(generation, |_| shared.publish(FeedEvent::Error(message)))
                    .is_none()
                {
                    return;
                }
            }
        }

        attempt += 1;
        if policy.is_exhausted(attempt) {
            error!(
                "giving up on {} after {} reconnect attempts",
                source.describe(),
                policy.max_attempts
            );
            shared.with_current(generation, |session| {
                shared.set_state(session, ConnectionState::Failed);
                session.task = None;
                shared.publish(FeedEvent::Failed {
                    attempts: policy.max_attempts,
                });
            });
            return;
        }

        let reconnecting = shared.with_current(generation, |session| {
            shared.set_state(session, ConnectionState::Reconnecting);
        });
        if reconnecting.is_none() {
            return;
        }
        info!(
            "reconnecting to {} (attempt {}/{}) in {:.1} ms",
            source.describe(),
            attempt,
            policy.max_attempts,
            policy.delay_ms(attempt)
        );
        tokio::time::sleep(policy.delay(attempt)).await;
    }
}

/// Forward frames until the connection ends.
///
/// Returns `false` if the session was superseded while reading.
async fn pump(
    shared: &Shared,
    config: &IngestorConfig,
    generation: u64,
    connection: &mut dyn FeedConnection,
) -> bool {
    while let Some(frame) = connection.next_message().await {
        match frame {
            Ok(text) => match normalize(config, &text) {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    if shared
                        .with_current(generation, |_| shared.publish(FeedEvent::Snapshot(snapshot)))
                        .is_none()
                    {
                        return false;
                    }
                }
                Err(e) => warn!("dropping malformed message: {}", e),
            },
            Err(e) => {
                warn!("feed error on {}:{}: {}", config.exchange, config.symbol, e);
                let message = e.to_string();
                return shared
                    .with_current(generation, |_| shared.publish(FeedEvent::Error(message)))
                    .is_some();
            }
        }
    }

    info!("feed {}:{} closed by peer", config.exchange, config.symbol);
    true
}

/// Parse one frame into a snapshot for the subscribed instrument
pub fn normalize(config: &IngestorConfig, text: &str) -> Result<OrderBookSnapshot> {
    let message = FeedMessage::parse(text)?;
    if !message.is_for(&config.exchange, &config.symbol) {
        return Err(GatewayError::UnexpectedInstrument {
            exchange: message.exchange,
            symbol: message.symbol,
        });
    }
    message.into_snapshot()
}

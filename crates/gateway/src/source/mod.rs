//! Feed sources
//!
//! A [`FeedSource`] opens connections; a [`FeedConnection`] yields raw text
//! frames until the peer goes away. The ingestor owns parsing, validation
//! and reconnection, so sources stay dumb transports.

pub mod synthetic;
pub mod websocket;

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Open a new connection to the feed
    async fn open(&self) -> Result<Box<dyn FeedConnection>>;

    /// Human-readable endpoint for logs
    fn describe(&self) -> String;
}

#[async_trait]
pub trait FeedConnection: Send {
    /// Next text frame.
    ///
    /// `None` means the stream ended; `Some(Err(_))` is a transport error
    /// after which the connection is considered dropped.
    async fn next_message(&mut self) -> Option<Result<String>>;

    /// Best-effort graceful close
    async fn close(&mut self) {}
}

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::{FeedConnection, FeedSource};
use crate::error::Result;

/// Live L2 feed over WebSocket
///
/// The endpoint pushes full book snapshots as text frames, so no subscribe
/// request is sent after the handshake. `wss://` URLs need the `tls` feature.
pub struct WebSocketSource {
    url: String,
}

impl WebSocketSource {
    pub fn new(url: impl Into<String>) -> Self {
        WebSocketSource { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for WebSocketSource {
    async fn open(&self) -> Result<Box<dyn FeedConnection>> {
        let (stream, response) = connect_async(self.url.as_str()).await?;
        log::debug!("{} handshake status {}", self.url, response.status());
        Ok(Box::new(WebSocketConnection { stream }))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FeedConnection for WebSocketConnection {
    async fn next_message(&mut self) -> Option<Result<String>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(e) => log::warn!("dropping non-UTF-8 binary frame: {}", e),
                },
                Ok(Message::Close(frame)) => {
                    log::debug!("close frame received: {:?}", frame);
                    return None;
                }
                Ok(Message::Ping(data)) => {
                    log::trace!("ping: {:?}", data);
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            log::debug!("error closing websocket: {}", e);
        }
    }
}

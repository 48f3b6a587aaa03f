//! WebSocket transport
//!
//! Production transport over `tokio-tungstenite`.

use super::{BoxTransport, Connector, Transport, TransportError, TransportEvent, EVENT_BUFFER_SIZE};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector dialing the gateway over `tokio-tungstenite`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Create a new WebSocket connector
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(BoxTransport, mpsc::Receiver<TransportEvent>), TransportError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::WebSocket(Box::new(e)))?;
        let (sink, read) = stream.split();

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        tokio::spawn(read_loop(read, event_tx));

        Ok((Box::new(WebSocketTransport { sink }), event_rx))
    }
}

/// Write half of an open WebSocket connection
struct WebSocketTransport {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::WebSocket(Box::new(e)))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::WebSocket(Box::new(e)))
    }
}

/// Pump inbound frames into the session's event channel
async fn read_loop(mut read: SplitStream<WsStream>, events: mpsc::Sender<TransportEvent>) {
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if events.send(TransportEvent::Frame(text)).await.is_err() {
                    // Session is gone; nothing left to deliver to.
                    return;
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!("ignoring binary frame");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // tungstenite answers pings on the next write
            }
            Ok(Message::Close(close)) => {
                let (code, reason) = match close {
                    Some(frame) => (Some(u16::from(frame.code)), frame.reason.into_owned()),
                    None => (None, String::new()),
                };
                let _ = events.send(TransportEvent::Closed { code, reason }).await;
                return;
            }
            Ok(Message::Frame(_)) => {}
            Err(err) => {
                let _ = events
                    .send(TransportEvent::Error(TransportError::WebSocket(Box::new(err))))
                    .await;
            }
        }
    }
    let _ = events
        .send(TransportEvent::Closed {
            code: None,
            reason: "connection reset".to_string(),
        })
        .await;
}

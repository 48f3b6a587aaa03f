//! Transport abstraction
//!
//! The session never parses raw socket frames. It drives a bidirectional
//! message channel: send one encoded frame, receive one [`TransportEvent`]
//! per inbound frame, observe close and error.

pub mod websocket;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use websocket::WebSocketConnector;

/// Buffer size for the inbound transport event channel
pub const EVENT_BUFFER_SIZE: usize = 100;

/// Transport-level errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying WebSocket failed
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// The transport is no longer usable
    #[error("transport channel closed")]
    ChannelClosed,

    /// The peer rejected the frame or the connection
    #[error("{0}")]
    Rejected(String),
}

/// Events surfaced by a transport to the session
#[derive(Debug)]
pub enum TransportEvent {
    /// One inbound structured text frame
    Frame(String),
    /// The transport closed, with close code and reason when available
    Closed {
        /// Close code from the peer, if any
        code: Option<u16>,
        /// Close reason from the peer, empty when absent
        reason: String,
    },
    /// A transport-level error; informational, a close follows if fatal
    Error(TransportError),
}

/// The write half of one open connection
#[async_trait]
pub trait Transport: Send {
    /// Send an encoded frame to the gateway
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Boxed transport handle owned by the session
pub type BoxTransport = Box<dyn Transport>;

/// Opens transports to the gateway
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`
    ///
    /// Returns the write half and the event stream fed by the read half.
    /// The implementation owns whatever read task it needs; the session only
    /// consumes the receiver and the transport handle.
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(BoxTransport, mpsc::Receiver<TransportEvent>), TransportError>;
}

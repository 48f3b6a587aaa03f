//! Gateway client error types

use crate::transport::TransportError;
use toplist_protocol::ProtocolError;

/// Errors surfaced by the gateway session
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Opening the transport failed
    #[error("failed to open gateway connection: {0}")]
    Connect(#[source] TransportError),

    /// Writing IDENTIFY failed during the handshake
    #[error("failed to send identify: {0}")]
    Identify(#[source] TransportError),

    /// The codec rejected a message
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The gateway sent a DISCONNECT with the given reason
    #[error("disconnected by gateway: {0}")]
    Disconnected(String),

    /// The transport closed while the handshake was still pending
    #[error("connection closed before ready: {reason} (code: {code:?})")]
    ConnectionClosed {
        /// Close code from the peer, if any
        code: Option<u16>,
        /// Close reason from the peer
        reason: String,
    },

    /// The caller's deadline elapsed before READY arrived
    #[error("timed out waiting for the gateway to become ready")]
    ConnectTimeout,

    /// A session is already live on this client
    #[error("session already connected")]
    AlreadyConnected,

    /// The session was shut down
    #[error("session shut down")]
    Shutdown,
}

/// Result type alias for session operations
pub type GatewayResult<T> = Result<T, GatewayError>;

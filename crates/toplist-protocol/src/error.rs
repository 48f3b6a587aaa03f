//! Protocol error types

use crate::OpCode;

/// Errors from encoding or decoding gateway messages
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Malformed JSON, a missing required field, or an unparseable value
    #[error("malformed gateway message: {0}")]
    Decode(#[from] serde_json::Error),

    /// The envelope carried no `data` where a payload was required
    #[error("{0} message carried no payload")]
    MissingPayload(OpCode),

    /// Clients only ever send IDENTIFY
    #[error("{0} is not a client-sent operation")]
    NotClientOp(OpCode),
}

/// Result type alias for codec operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

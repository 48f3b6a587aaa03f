//! Gateway operation codes
//!
//! Defines the op codes exchanged over the gateway connection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
///
/// Op codes define the type of message being sent or received over the
/// gateway connection. Directionality is fixed per code: the client only
/// ever sends `Identify`; everything else comes from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// First message on a new connection (server only)
    Hello = 1,
    /// Authenticate the session with a token (client only)
    Identify = 2,
    /// Authentication accepted, events will follow (server only)
    Ready = 3,
    /// Server is about to drop the connection (server only)
    Disconnect = 4,
    /// Asynchronous business event (server only)
    Event = 5,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Hello),
            2 => Some(Self::Identify),
            3 => Some(Self::Ready),
            4 => Some(Self::Disconnect),
            5 => Some(Self::Event),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this op code can be sent by the client
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(self, Self::Identify)
    }

    /// Check if this op code can be sent by the server
    #[must_use]
    pub const fn is_server_op(self) -> bool {
        matches!(
            self,
            Self::Hello | Self::Ready | Self::Disconnect | Self::Event
        )
    }

    /// Get the protocol name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hello => "HELLO",
            Self::Identify => "IDENTIFY",
            Self::Ready => "READY",
            Self::Disconnect => "DISCONNECT",
            Self::Event => "EVENT",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value).ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

//! Gateway event kinds
//!
//! Defines the event kinds carried in the `event` field of EVENT messages.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway event kinds
///
/// Only meaningful when the envelope op code is EVENT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A user voted for the entity assigned to the token
    Vote,
    /// A user rated the entity assigned to the token
    Rate,
    /// A kind this client does not recognize; ignored on dispatch
    Unknown,
}

impl EventKind {
    /// Get the string representation of the event kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vote => "VOTE",
            Self::Rate => "RATE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse an event kind from a string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "VOTE" => Some(Self::Vote),
            "RATE" => Some(Self::Rate),
            _ => None,
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    // Unrecognized kinds decode to `Unknown` so an envelope carrying a
    // future event kind still parses; dispatch drops it.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value).unwrap_or(Self::Unknown))
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

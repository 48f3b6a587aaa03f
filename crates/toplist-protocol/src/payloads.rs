//! Gateway payload definitions
//!
//! Defines the nested payload structures carried in the `data` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload for op 2 (Identify)
///
/// Sent by the client once, immediately after HELLO is received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Gateway token for the entity
    pub token: String,
}

/// The kind of listed entity a vote or rating refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// A listed bot
    #[serde(rename = "bots")]
    Bot,
    /// A listed server
    #[serde(rename = "servers")]
    Server,
}

impl EntityType {
    /// Get the wire representation of the entity type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bot => "bots",
            Self::Server => "servers",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a VOTE event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    /// ID of the user who cast the vote
    #[serde(rename = "authorID")]
    pub author_id: String,

    /// What kind of entity was voted for
    #[serde(rename = "entityType")]
    pub entity_type: EntityType,

    /// ID of the entity that received the vote
    #[serde(rename = "entityID")]
    pub entity_id: String,

    /// When the vote was cast (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,

    /// Total votes of the entity, not only from this user
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
}

/// Payload of a RATE event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEvent {
    /// Number of stars given
    pub rating: u8,

    /// Review text the user attached to the rating
    pub details: String,

    /// ID of the user who rated
    #[serde(rename = "authorID")]
    pub author_id: String,

    /// What kind of entity was rated
    #[serde(rename = "entityType")]
    pub entity_type: EntityType,

    /// ID of the entity that was rated
    #[serde(rename = "entityID")]
    pub entity_id: String,

    /// When the rating was submitted (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

//! # toplist-protocol
//!
//! Wire protocol for the toplist gateway: operation codes, event kinds,
//! payload envelopes, and their JSON codec. Pure data, no I/O.

pub mod error;
pub mod events;
pub mod messages;
pub mod opcodes;
pub mod payloads;

pub use error::ProtocolError;
pub use events::EventKind;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{EntityType, IdentifyPayload, RateEvent, VoteEvent};

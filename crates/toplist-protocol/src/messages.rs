//! Gateway message envelope
//!
//! Defines the outer structure wrapping every message on the connection.

use crate::{EventKind, IdentifyPayload, OpCode, ProtocolError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message envelope
///
/// All messages exchanged with the gateway follow this format. `event` is
/// present only on EVENT-coded messages; `data` holds a nested payload whose
/// shape depends on `op` and `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event kind (only for op=5 Event)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event: Option<EventKind>,

    /// Nested payload
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,
}

impl GatewayMessage {
    /// Create an Identify message (op=2) carrying the given token
    #[must_use]
    pub fn identify(token: impl Into<String>) -> Self {
        let payload = IdentifyPayload {
            token: token.into(),
        };
        Self {
            op: OpCode::Identify,
            event: None,
            data: serde_json::to_value(payload).ok(),
        }
    }

    /// Serialize to the JSON wire form
    ///
    /// Only client-sent operations can be encoded; anything else is a
    /// protocol violation and fails with [`ProtocolError::NotClientOp`].
    pub fn encode(&self) -> Result<String, ProtocolError> {
        if !self.op.is_client_op() {
            return Err(ProtocolError::NotClientOp(self.op));
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize an envelope from its JSON wire form
    ///
    /// A missing `event` field is tolerated; a malformed envelope fails
    /// without side effects.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Decode the nested `data` payload into a typed value
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        let data = self
            .data
            .as_ref()
            .ok_or(ProtocolError::MissingPayload(self.op))?;
        Ok(serde_json::from_value(data.clone())?)
    }

    /// The `data` of a DISCONNECT message as UTF-8 text
    #[must_use]
    pub fn disconnect_reason(&self) -> String {
        match &self.data {
            Some(Value::String(reason)) => reason.clone(),
            Some(other) => other.to_string(),
            None => "connection closed by gateway".to_string(),
        }
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.event {
            Some(event) => write!(f, "GatewayMessage(op={}, event={event})", self.op),
            None => write!(f, "GatewayMessage(op={})", self.op),
        }
    }
}

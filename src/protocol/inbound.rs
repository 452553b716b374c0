//! Classification of raw inbound messages.
//!
//! Anything that is neither a well-formed event nor a response carrying a
//! `requestId` classifies as `None`. Parsing never fails loudly: stray
//! traffic is expected while the frame is still loading.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use super::{CommandResponse, EmbeddedEvent, EventEnvelope, MessageType};

// ============================================================================
// InboundEnvelope
// ============================================================================

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEnvelope {
    /// Out-of-band notification.
    Event(EmbeddedEvent),
    /// Response to a command.
    Response(CommandResponse),
}

impl InboundEnvelope {
    /// Classifies a raw message payload.
    #[must_use]
    pub fn parse(data: &Value) -> Option<Self> {
        let message_type = data.get("type").and_then(Value::as_str);

        if message_type == Some(MessageType::Event.as_str()) {
            let envelope: EventEnvelope = serde_json::from_value(data.clone()).ok()?;
            return Some(Self::Event(EmbeddedEvent::from_envelope(envelope)));
        }

        if data.get("requestId").is_some_and(Value::is_string) {
            return serde_json::from_value::<CommandResponse>(data.clone())
                .ok()
                .filter(|response| response.message_type != Some(MessageType::Command))
                .map(Self::Response);
        }

        None
    }
}

// ============================================================================
// Tests
// ============================================================================

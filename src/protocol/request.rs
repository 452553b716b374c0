//! Command and response envelopes.
//!
//! # Format
//!
//! Command (host → embedded):
//! ```json
//! {
//!   "type": "CORTI_EMBEDDED",
//!   "version": "v1",
//!   "action": "navigate",
//!   "requestId": "req_...",
//!   "payload": { "path": "/" }
//! }
//! ```
//!
//! Response (embedded → host):
//! ```json
//! {
//!   "type": "CORTI_EMBEDDED_RESPONSE",
//!   "version": "v1",
//!   "action": "navigate",
//!   "requestId": "req_...",
//!   "success": false,
//!   "error": "Bad request",
//!   "errorCode": "400",
//!   "errorDetails": { ... }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::{ActionName, Command};

// ============================================================================
// Constants
// ============================================================================

/// Message used when a failed response carries no error text.
const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

// ============================================================================
// MessageType / ProtocolVersion
// ============================================================================

/// Envelope discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    /// Host → embedded command.
    #[serde(rename = "CORTI_EMBEDDED")]
    Command,
    /// Embedded → host response.
    #[serde(rename = "CORTI_EMBEDDED_RESPONSE")]
    Response,
    /// Embedded → host notification.
    #[serde(rename = "CORTI_EMBEDDED_EVENT")]
    Event,
}

impl MessageType {
    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Command => "CORTI_EMBEDDED",
            Self::Response => "CORTI_EMBEDDED_RESPONSE",
            Self::Event => "CORTI_EMBEDDED_EVENT",
        }
    }
}

/// Protocol version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// The only version in use.
    #[default]
    #[serde(rename = "v1")]
    V1,
}

// ============================================================================
// CommandEnvelope
// ============================================================================

/// An outbound command with its correlation id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEnvelope {
    /// Always [`MessageType::Command`].
    #[serde(rename = "type")]
    pub message_type: MessageType,

    /// Protocol version.
    pub version: ProtocolVersion,

    /// Correlation token echoed by the response.
    #[serde(rename = "requestId")]
    pub request_id: RequestId,

    /// Action and payload.
    #[serde(flatten)]
    pub command: Command,
}

impl CommandEnvelope {
    /// Wraps a command with a fresh request ID.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self::with_id(RequestId::generate(), command)
    }

    /// Wraps a command with a specific request ID.
    #[inline]
    #[must_use]
    pub fn with_id(request_id: RequestId, command: Command) -> Self {
        Self {
            message_type: MessageType::Command,
            version: ProtocolVersion::V1,
            request_id,
            command,
        }
    }

    /// Returns the action this envelope carries.
    #[inline]
    #[must_use]
    pub fn action(&self) -> ActionName {
        self.command.action()
    }
}

// ============================================================================
// CommandResponse
// ============================================================================

/// A response to a command.
///
/// Only `requestId` is required to correlate; every other field is
/// tolerated as missing, and unfamiliar `type`, `version` or `action`
/// values read as absent. A response fails when `success` is `false` or a
/// non-empty `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Envelope tag, normally [`MessageType::Response`].
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_type: Option<MessageType>,

    /// Protocol version.
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<ProtocolVersion>,

    /// Originating action.
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<ActionName>,

    /// Matches the command's `requestId`.
    pub request_id: RequestId,

    /// Success flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// Result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Machine-readable error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Structured error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,
}

impl CommandResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn success(action: ActionName, request_id: RequestId, payload: Option<Value>) -> Self {
        Self {
            message_type: Some(MessageType::Response),
            version: Some(ProtocolVersion::V1),
            action: Some(action),
            request_id,
            success: Some(true),
            payload,
            error: None,
            error_code: None,
            error_details: None,
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub fn failure(
        action: ActionName,
        request_id: RequestId,
        error: impl Into<String>,
        error_code: Option<String>,
    ) -> Self {
        Self {
            success: Some(false),
            payload: None,
            error: Some(error.into()),
            error_code,
            ..Self::success(action, request_id, None)
        }
    }

    /// Returns `true` if the embedded side reported success.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success != Some(false) && self.error.as_deref().is_none_or(str::is_empty)
    }

    /// Turns a failed response into [`Error::RemoteFailure`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteFailure`] carrying the error fields verbatim.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let message = self
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        Err(Error::remote_failure(
            message,
            self.error_code,
            self.error_details,
        ))
    }

    /// Deserializes the payload into the shape the action promises.
    ///
    /// # Errors
    ///
    /// - [`Error::RemoteFailure`] if the payload is missing and the response
    ///   carries an error message
    /// - [`Error::Protocol`] if the payload is missing without explanation
    /// - [`Error::Json`] if the payload has the wrong shape
    pub fn payload_as<T: DeserializeOwned>(self) -> Result<T> {
        match self.payload {
            Some(payload) if !payload.is_null() => Ok(serde_json::from_value(payload)?),
            _ => match self.error.filter(|e| !e.is_empty()) {
                Some(message) => Err(Error::remote_failure(
                    message,
                    self.error_code,
                    self.error_details,
                )),
                None => Err(Error::protocol(format!(
                    "response {} carried no payload",
                    self.request_id
                ))),
            },
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Reads an informational tag; values outside the known set become `None`.
fn lenient_tag<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::payload::NavigatePayload;

    #[test]
    fn test_command_envelope_serialization() {
        let envelope = CommandEnvelope::with_id(RequestId::from("req_1"), Command::navigate("/a"));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "CORTI_EMBEDDED",
                "version": "v1",
                "requestId": "req_1",
                "action": "navigate",
                "payload": { "path": "/a" }
            })
        );
    }

    #[test]
    fn test_fresh_envelopes_get_distinct_ids() {
        let a = CommandEnvelope::new(Command::GetStatus {});
        let b = CommandEnvelope::new(Command::GetStatus {});
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.action(), ActionName::GetStatus);
    }

    #[test]
    fn test_minimal_response_parses_as_success() {
        let response: CommandResponse =
            serde_json::from_value(json!({ "requestId": "req_1", "payload": { "ok": true } }))
                .unwrap();
        assert!(response.is_success());
        assert_eq!(response.action, None);
    }

    #[test]
    fn test_unfamiliar_tags_still_correlate() {
        let response: CommandResponse = serde_json::from_value(json!({
            "type": "CORTI_EMBEDDED_RESPONSE",
            "version": "v2",
            "action": "summarize",
            "requestId": "req_1",
            "success": true,
            "payload": { "ok": true }
        }))
        .unwrap();
        assert_eq!(response.request_id.as_str(), "req_1");
        assert_eq!(response.version, None);
        assert_eq!(response.action, None);
        assert!(response.is_success());
    }

    #[test]
    fn test_failed_response_into_result() {
        let response: CommandResponse = serde_json::from_value(json!({
            "type": "CORTI_EMBEDDED_RESPONSE",
            "version": "v1",
            "action": "navigate",
            "requestId": "req_1",
            "success": false,
            "error": "Bad request",
            "errorCode": "400",
            "errorDetails": { "path": ["path"] }
        }))
        .unwrap();

        let err = response.into_result().unwrap_err();
        assert!(err.to_string().contains("Bad request"));
        match err {
            Error::RemoteFailure { code, details, .. } => {
                assert_eq!(code.as_deref(), Some("400"));
                assert_eq!(details, Some(json!({ "path": ["path"] })));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_field_alone_fails() {
        let response: CommandResponse =
            serde_json::from_value(json!({ "requestId": "req_1", "error": "nope" })).unwrap();
        assert!(!response.is_success());
    }

    #[test]
    fn test_failure_without_message_uses_default() {
        let response: CommandResponse =
            serde_json::from_value(json!({ "requestId": "req_1", "success": false })).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Request failed");
    }

    #[test]
    fn test_payload_as_typed() {
        let response = CommandResponse::success(
            ActionName::Navigate,
            RequestId::from("req_1"),
            Some(json!({ "path": "/x" })),
        );
        let payload: NavigatePayload = response.payload_as().unwrap();
        assert_eq!(payload.path, "/x");
    }

    #[test]
    fn test_payload_as_missing_payload() {
        let response = CommandResponse::success(ActionName::GetStatus, RequestId::from("r"), None);
        let err = response.payload_as::<NavigatePayload>().unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));

        let mut response = CommandResponse::success(ActionName::GetStatus, RequestId::from("r"), None);
        response.error = Some("Interaction not loaded".into());
        let err = response.payload_as::<NavigatePayload>().unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.to_string(), "Interaction not loaded");
    }

    #[test]
    fn test_payload_as_wrong_shape() {
        let response = CommandResponse::success(
            ActionName::Navigate,
            RequestId::from("r"),
            Some(json!({ "nope": 1 })),
        );
        let err = response.payload_as::<NavigatePayload>().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}

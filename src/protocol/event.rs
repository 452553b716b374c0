//! Event message types.
//!
//! Events are out-of-band notifications from the embedded application.
//! Two generations share the `CORTI_EMBEDDED_EVENT` tag:
//!
//! | Generation | Event name | Extra field |
//! |------------|------------|-------------|
//! | Current | open string | `confidential: bool` |
//! | Legacy | closed [`LegacyEvent`] set | `deprecated: true` |
//!
//! Both are folded into [`EmbeddedEvent`] and routed by wire name, so a
//! subscriber sees the same thing regardless of which generation sent it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// LegacyEvent
// ============================================================================

/// The closed event vocabulary of the legacy protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyEvent {
    /// The embedded application accepts commands.
    Ready,
    /// The embedded application finished loading.
    Loaded,
    /// Recording started.
    RecordingStarted,
    /// Recording stopped.
    RecordingStopped,
    /// A document was generated.
    DocumentGenerated,
    /// A document was updated.
    DocumentUpdated,
    /// A document was synced.
    DocumentSynced,
    /// The signed-in user changed.
    AuthChanged,
    /// An interaction was created.
    InteractionCreated,
    /// The embedded route changed.
    NavigationChanged,
    /// Credits were consumed.
    Usage,
}

impl LegacyEvent {
    /// Every legacy event.
    pub const ALL: [Self; 11] = [
        Self::Ready,
        Self::Loaded,
        Self::RecordingStarted,
        Self::RecordingStopped,
        Self::DocumentGenerated,
        Self::DocumentUpdated,
        Self::DocumentSynced,
        Self::AuthChanged,
        Self::InteractionCreated,
        Self::NavigationChanged,
        Self::Usage,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Loaded => "loaded",
            Self::RecordingStarted => "recordingStarted",
            Self::RecordingStopped => "recordingStopped",
            Self::DocumentGenerated => "documentGenerated",
            Self::DocumentUpdated => "documentUpdated",
            Self::DocumentSynced => "documentSynced",
            Self::AuthChanged => "authChanged",
            Self::InteractionCreated => "interactionCreated",
            Self::NavigationChanged => "navigationChanged",
            Self::Usage => "usage",
        }
    }

    /// Returns the name the host re-publishes this event under.
    #[must_use]
    pub const fn public_name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Loaded => "loaded",
            Self::RecordingStarted => "recording-started",
            Self::RecordingStopped => "recording-stopped",
            Self::DocumentGenerated => "document-generated",
            Self::DocumentUpdated => "document-updated",
            Self::DocumentSynced => "document-synced",
            Self::AuthChanged => "auth-changed",
            Self::InteractionCreated => "interaction-created",
            Self::NavigationChanged => "navigation-changed",
            Self::Usage => "usage",
        }
    }

    /// Returns `true` for events that mean the frame accepts commands.
    #[inline]
    #[must_use]
    pub const fn is_ready_equivalent(self) -> bool {
        matches!(self, Self::Ready | Self::Loaded)
    }
}

impl fmt::Display for LegacyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyEvent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or(())
    }
}

// ============================================================================
// EventEnvelope
// ============================================================================

/// Raw `CORTI_EMBEDDED_EVENT` fields, shared by both generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name.
    pub event: String,

    /// Event payload.
    #[serde(default)]
    pub payload: Option<Value>,

    /// Current generation: payload confidentiality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,

    /// Legacy generation marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

// ============================================================================
// EmbeddedEvent
// ============================================================================

/// An inbound event of either protocol generation.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedEvent {
    /// Open-vocabulary notification.
    Current {
        /// Event name.
        name: String,
        /// Event payload.
        payload: Option<Value>,
        /// Whether the payload is confidential.
        confidential: bool,
    },

    /// Closed-vocabulary notification.
    Legacy {
        /// Event kind.
        event: LegacyEvent,
        /// Event payload.
        payload: Option<Value>,
    },
}

impl EmbeddedEvent {
    /// Classifies a raw event envelope.
    ///
    /// An envelope carrying `confidential` belongs to the current
    /// generation. Otherwise a name in the legacy vocabulary is a legacy
    /// event and anything else is treated as a current, non-confidential
    /// event.
    #[must_use]
    pub fn from_envelope(envelope: EventEnvelope) -> Self {
        let EventEnvelope {
            event,
            payload,
            confidential,
            ..
        } = envelope;

        if let Some(confidential) = confidential {
            return Self::Current {
                name: event,
                payload,
                confidential,
            };
        }

        match event.parse::<LegacyEvent>() {
            Ok(legacy) => Self::Legacy {
                event: legacy,
                payload,
            },
            Err(()) => Self::Current {
                name: event,
                payload,
                confidential: false,
            },
        }
    }

    /// Returns the wire name subscribers are keyed by.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Current { name, .. } => name,
            Self::Legacy { event, .. } => event.as_str(),
        }
    }

    /// Returns the payload, treating JSON `null` as absent.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        let payload = match self {
            Self::Current { payload, .. } | Self::Legacy { payload, .. } => payload.as_ref(),
        };
        payload.filter(|p| !p.is_null())
    }

    /// Returns the legacy kind this event corresponds to, by name.
    #[must_use]
    pub fn legacy_kind(&self) -> Option<LegacyEvent> {
        match self {
            Self::Legacy { event, .. } => Some(*event),
            Self::Current { name, .. } => name.parse().ok(),
        }
    }

    /// Returns `true` if the frame is signaling it accepts commands.
    #[inline]
    #[must_use]
    pub fn is_ready_equivalent(&self) -> bool {
        self.legacy_kind()
            .is_some_and(LegacyEvent::is_ready_equivalent)
    }

    /// Returns `true` if the payload is marked confidential.
    #[inline]
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        matches!(
            self,
            Self::Current {
                confidential: true,
                ..
            }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

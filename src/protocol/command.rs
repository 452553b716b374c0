//! Command definitions.
//!
//! Every command the host can issue to the embedded application is a
//! variant of [`Command`], carrying the payload shape that action expects.
//!
//! # Actions
//!
//! | Action | Payload |
//! |--------|---------|
//! | `auth` | [`AuthPayload`] |
//! | `createInteraction` | [`CreateInteractionPayload`] |
//! | `addFacts` | [`AddFactsPayload`] |
//! | `configureSession` | [`ConfigureSessionPayload`] |
//! | `navigate` | [`NavigatePayload`] |
//! | `startRecording` | `{}` |
//! | `stopRecording` | `{}` |
//! | `getStatus` | `{}` |
//! | `configure` | [`ConfigureAppPayload`] |
//! | `setCredentials` | [`SetCredentialsPayload`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::payload::{
    AddFactsPayload, AuthPayload, ConfigureAppPayload, ConfigureSessionPayload,
    CreateInteractionPayload, NavigatePayload, SetCredentialsPayload,
};

// ============================================================================
// ActionName
// ============================================================================

/// Wire name of a command action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionName {
    /// Authenticate the embedded session.
    Auth,
    /// Create a new interaction.
    CreateInteraction,
    /// Add facts to the current interaction.
    AddFacts,
    /// Set session defaults.
    ConfigureSession,
    /// Navigate inside the embedded application.
    Navigate,
    /// Start dictation recording.
    StartRecording,
    /// Stop dictation recording.
    StopRecording,
    /// Query current status.
    GetStatus,
    /// Configure appearance, features, locale and network.
    Configure,
    /// Set credentials without an auth round trip.
    SetCredentials,
}

impl ActionName {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::CreateInteraction => "createInteraction",
            Self::AddFacts => "addFacts",
            Self::ConfigureSession => "configureSession",
            Self::Navigate => "navigate",
            Self::StartRecording => "startRecording",
            Self::StopRecording => "stopRecording",
            Self::GetStatus => "getStatus",
            Self::Configure => "configure",
            Self::SetCredentials => "setCredentials",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Command
// ============================================================================

/// A command with its action-specific payload.
///
/// Serializes as `{"action": ..., "payload": ...}` and is flattened into
/// the outbound envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum Command {
    /// Authenticate with a token response.
    #[serde(rename = "auth")]
    Auth(AuthPayload),

    /// Create a new interaction.
    #[serde(rename = "createInteraction")]
    CreateInteraction(CreateInteractionPayload),

    /// Add facts to the current interaction.
    #[serde(rename = "addFacts")]
    AddFacts(AddFactsPayload),

    /// Set session defaults.
    #[serde(rename = "configureSession")]
    ConfigureSession(ConfigureSessionPayload),

    /// Navigate to a path inside the embedded application.
    #[serde(rename = "navigate")]
    Navigate(NavigatePayload),

    /// Start recording.
    #[serde(rename = "startRecording")]
    StartRecording {},

    /// Stop recording.
    #[serde(rename = "stopRecording")]
    StopRecording {},

    /// Get current status.
    #[serde(rename = "getStatus")]
    GetStatus {},

    /// Configure the embedded application.
    #[serde(rename = "configure")]
    Configure(ConfigureAppPayload),

    /// Set credentials.
    #[serde(rename = "setCredentials")]
    SetCredentials(SetCredentialsPayload),
}

impl Command {
    /// Returns the action this command performs.
    #[must_use]
    pub const fn action(&self) -> ActionName {
        match self {
            Self::Auth(_) => ActionName::Auth,
            Self::CreateInteraction(_) => ActionName::CreateInteraction,
            Self::AddFacts(_) => ActionName::AddFacts,
            Self::ConfigureSession(_) => ActionName::ConfigureSession,
            Self::Navigate(_) => ActionName::Navigate,
            Self::StartRecording {} => ActionName::StartRecording,
            Self::StopRecording {} => ActionName::StopRecording,
            Self::GetStatus {} => ActionName::GetStatus,
            Self::Configure(_) => ActionName::Configure,
            Self::SetCredentials(_) => ActionName::SetCredentials,
        }
    }

    /// Creates a navigate command.
    #[inline]
    #[must_use]
    pub fn navigate(path: impl Into<String>) -> Self {
        Self::Navigate(NavigatePayload { path: path.into() })
    }
}

// ============================================================================
// Tests
// ============================================================================

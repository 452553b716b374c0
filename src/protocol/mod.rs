//! Wire protocol between the host page and the embedded application.
//!
//! # Protocol Overview
//!
//! | Message Type | Tag | Direction | Purpose |
//! |--------------|-----|-----------|---------|
//! | [`CommandEnvelope`] | `CORTI_EMBEDDED` | Host → Embedded | Command request |
//! | [`CommandResponse`] | `CORTI_EMBEDDED_RESPONSE` | Embedded → Host | Command response |
//! | [`EventEnvelope`] | `CORTI_EMBEDDED_EVENT` | Embedded → Host | Notification |
//!
//! Every envelope carries `version: "v1"`. Commands and responses are
//! correlated by `requestId`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Action names and the [`Command`] union |
//! | `event` | Event generations and the legacy vocabulary |
//! | `inbound` | Classification of raw inbound messages |
//! | `payload` | Typed request and response payloads |
//! | `request` | Command and response envelopes |

// ============================================================================
// Submodules
// ============================================================================

/// Action names and commands.
pub mod command;

/// Event message types.
pub mod event;

/// Inbound message classification.
pub mod inbound;

/// Typed payloads.
pub mod payload;

/// Command and response envelopes.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{ActionName, Command};
pub use event::{EmbeddedEvent, EventEnvelope, LegacyEvent};
pub use inbound::InboundEnvelope;
pub use payload::{
    AddFactsPayload, AppearanceConfig, AuthMode, AuthPayload, AuthResponse, AuthStatus,
    ConfigureAppPayload, ConfigureAppResponse, ConfigureSessionPayload, CreateInteractionPayload,
    CreateInteractionResponse, DefaultMode, Encounter, EncounterPeriod, Fact, FeaturesConfig,
    FeaturesPatch, GetStatusResponse, LocaleConfig, LocalePatch, NavigatePayload, NetworkConfig,
    Patient, SetCredentialsPayload, TokenProfile, UserInfo,
};
pub use request::{CommandEnvelope, CommandResponse, MessageType, ProtocolVersion};

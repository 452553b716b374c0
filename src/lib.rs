//! Corti Embedded - Messaging core for embedding the Corti Assistant.
//!
//! This library drives an embedded Assistant frame from its host page over
//! origin-scoped cross-document messaging: typed commands with correlated
//! responses, a readiness gate, and event fan-out.
//!
//! # Architecture
//!
//! The host and the embedded application exchange three kinds of messages:
//!
//! - **Commands** (`CORTI_EMBEDDED`): host to frame, tagged with a request ID
//! - **Responses** (`CORTI_EMBEDDED_RESPONSE`): frame to host, echoing the ID
//! - **Events** (`CORTI_EMBEDDED_EVENT`): frame to host, unsolicited
//!
//! Key design principles:
//!
//! - Only one origin is ever trusted, derived from a validated base address
//! - Inbound messages must match that origin AND the frame's own window
//! - Commands are never posted before the frame signals `ready`
//! - Every failure surfaces to the caller; nothing is retried internally
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use corti_embedded::transport::{LocalFrame, LocalWindow};
//! use corti_embedded::{AuthMode, AuthPayload, EmbedHost, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let window = Arc::new(LocalWindow::new());
//!     let host = EmbedHost::builder()
//!         .base_address("https://assistant.eu.corti.app")
//!         .on_error(|report| eprintln!("{report}"))
//!         .build(window)?;
//!
//!     let (frame, _outbox) = LocalFrame::new("about:blank");
//!     host.attach_frame(frame.clone());
//!     host.handle_frame_load(frame)?;
//!
//!     let user = host
//!         .authenticate(AuthPayload::bearer("access-token", AuthMode::Stateless))
//!         .await?;
//!     println!("Signed in as {}", user.email);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | [`Bridge`]: correlation, readiness, events |
//! | [`host`] | [`EmbedHost`]: base address and frame lifecycle |
//! | [`origin`] | Base address validation and origin checks |
//! | [`protocol`] | Wire message types |
//! | [`transport`] | Host environment traits and the in-process transport |
//! | [`report`] | Host-facing [`ErrorReport`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Messaging bridge to one embedded frame.
///
/// - [`Bridge`] - Correlator and readiness gate
/// - [`EventDispatcher`](bridge::EventDispatcher) - Event callbacks
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Embedding lifecycle controller.
///
/// Use [`EmbedHost::builder()`] to create a configured host.
pub mod host;

/// Type-safe identifiers for requests, windows and listeners.
pub mod identifiers;

/// Base address validation and origin checks.
pub mod origin;

/// Wire message types.
pub mod protocol;

/// Host-facing error reports.
pub mod report;

/// Cross-document messaging transport.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{
    Bridge, BridgeOptions, EventCallback, EventForwarder, EventStream, event_callback,
    event_forwarder,
};

// Host types
pub use host::{EmbedHost, EmbedHostBuilder, EmbedOptions, HostCallbacks, HostStatus};

// Error types
pub use error::{Error, Result};
pub use report::ErrorReport;

// Identifier types
pub use identifiers::{ListenerId, RequestId, SourceId};

// Origin helpers
pub use origin::{TrustedOrigin, build_embed_address, is_genuine_load, resolve_origin};

// Protocol types
pub use protocol::{
    AddFactsPayload, AuthMode, AuthPayload, Command, CommandResponse, ConfigureAppPayload,
    ConfigureAppResponse, ConfigureSessionPayload, CreateInteractionPayload,
    CreateInteractionResponse, EmbeddedEvent, Fact, GetStatusResponse, LegacyEvent, UserInfo,
};

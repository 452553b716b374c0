//! Cross-document messaging transport.
//!
//! The bridge never talks to a browser directly. The host environment
//! supplies three collaborators:
//!
//! | Trait | Role |
//! |-------|------|
//! | [`MessageTarget`] | The parent window's message bus: listener registration |
//! | [`FrameElement`] | The embedding frame: its `src` and live content window |
//! | [`ContentWindow`] | The frame's document: identity and `postMessage` |
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Host page      │        postMessage           │  Embedded app   │
//! │                 │ ──────────────────────────►  │  (frame)        │
//! │  Bridge         │   target = trusted origin    │                 │
//! │  └ listener ◄───┼──────────────────────────────│                 │
//! │   (origin +     │   MessageEvent {origin,      │                 │
//! │    source check)│   source, data}              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Implementations
//!
//! - `local` - In-process bus and frame, for tests and native hosts that
//!   bridge their own IPC into this crate

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::identifiers::{ListenerId, SourceId};

// ============================================================================
// Submodules
// ============================================================================

/// In-process transport implementation.
pub mod local;

// ============================================================================
// Re-exports
// ============================================================================

pub use local::{LocalFrame, LocalWindow, PostedMessage};

// ============================================================================
// MessageEvent
// ============================================================================

/// One inbound message as delivered by the host environment.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// Origin of the sending document, e.g. `https://assistant.eu.corti.app`.
    pub origin: String,
    /// Identity of the sending window, if known.
    pub source: Option<SourceId>,
    /// Structured-clone payload.
    pub data: Value,
}

impl MessageEvent {
    /// Creates a message event.
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>, source: Option<SourceId>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            source,
            data,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A frame's content window.
pub trait ContentWindow: Send + Sync {
    /// Identity compared against [`MessageEvent::source`].
    fn id(&self) -> SourceId;

    /// Posts a message restricted to `target_origin`.
    ///
    /// `target_origin` is always an exact origin, never `"*"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) if the host
    /// cannot deliver the message.
    fn post_message(&self, message: &Value, target_origin: &str) -> Result<()>;
}

/// The element hosting the embedded application.
pub trait FrameElement: Send + Sync {
    /// Current `src`, if set.
    fn src(&self) -> Option<String>;

    /// Points the frame at a new address.
    fn set_src(&self, src: &str);

    /// Live content window, if the frame currently has one.
    fn content_window(&self) -> Option<Arc<dyn ContentWindow>>;
}

/// The parent window's message bus.
pub trait MessageTarget: Send + Sync {
    /// Registers a listener; every message posted to the parent window is
    /// delivered to the returned receiver in order.
    fn add_listener(&self) -> (ListenerId, mpsc::UnboundedReceiver<MessageEvent>);

    /// Unregisters a listener. Unknown IDs are ignored.
    fn remove_listener(&self, id: ListenerId);
}

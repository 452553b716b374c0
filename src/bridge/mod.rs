//! Messaging bridge to one embedded frame.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bridge`] | Listener, request/response correlation, readiness gate |
//! | [`EventDispatcher`] | Named callbacks, payload streams, forwarder |
//! | [`BridgeOptions`] | Response and readiness timeouts |
//!
//! Typed wrappers (`authenticate`, `get_status`, ...) are methods on
//! [`Bridge`] and build on [`Bridge::send`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use corti_embedded::bridge::{Bridge, event_callback};
//! use corti_embedded::transport::{LocalFrame, LocalWindow};
//!
//! # async fn example() -> corti_embedded::Result<()> {
//! let window = Arc::new(LocalWindow::new());
//! let (frame, _outbox) = LocalFrame::new("https://assistant.eu.corti.app/embedded");
//! let bridge = Bridge::new(frame, window);
//!
//! bridge.on("recording-started", event_callback(|_| println!("recording")));
//! bridge.wait_for_ready().await?;
//! bridge.start_recording().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Typed command wrappers.
mod commands;

/// Correlator and readiness gate.
pub mod core;

/// Event callback registry.
pub mod dispatcher;

/// Bridge timing configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Bridge;
pub use dispatcher::{
    EventCallback, EventDispatcher, EventForwarder, EventStream, event_callback, event_forwarder,
};
pub use options::{BridgeOptions, DEFAULT_READY_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};

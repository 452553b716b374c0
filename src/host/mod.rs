//! Framework-independent embedding lifecycle.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EmbedHost`] | Base address, frame and bridge lifecycle |
//! | [`EmbedHostBuilder`] | Fluent configuration builder |
//! | [`EmbedOptions`] | Base address and timeouts |
//! | [`HostCallbacks`] | Readiness, event and error callbacks |
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use corti_embedded::EmbedHost;
//! use corti_embedded::transport::{LocalFrame, LocalWindow};
//!
//! # async fn example() -> corti_embedded::Result<()> {
//! let host = EmbedHost::builder()
//!     .on_event(|name, _| println!("event: {name}"))
//!     .build(Arc::new(LocalWindow::new()))?;
//!
//! let (frame, _outbox) = LocalFrame::new("about:blank");
//! host.attach_frame(frame.clone());
//!
//! // Once the frame reports a load:
//! host.handle_frame_load(frame)?;
//! host.start_recording().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for host configuration.
pub mod builder;

/// Core host implementation.
pub mod core;

/// Host options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::{
    BLANK_ADDRESS, EmbedHost, ErrorCallback, HostCallbacks, HostEventCallback, HostStatus,
    ReadyCallback,
};
pub use builder::EmbedHostBuilder;
pub use options::{DEFAULT_BASE_ADDRESS, EmbedOptions};

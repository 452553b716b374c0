//! Builder pattern for host configuration.
//!
//! Provides a fluent API for configuring and creating [`EmbedHost`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use corti_embedded::EmbedHost;
//! use corti_embedded::transport::LocalWindow;
//!
//! # fn example() -> corti_embedded::Result<()> {
//! let host = EmbedHost::builder()
//!     .base_address("https://assistant.us.corti.app")
//!     .on_ready(|| println!("ready"))
//!     .on_error(|report| eprintln!("embed error: {report}"))
//!     .build(Arc::new(LocalWindow::new()))?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::Result;
use crate::report::ErrorReport;
use crate::transport::MessageTarget;

use super::core::{EmbedHost, HostCallbacks};
use super::options::EmbedOptions;

// ============================================================================
// EmbedHostBuilder
// ============================================================================

/// Builder for configuring an [`EmbedHost`].
///
/// Use [`EmbedHost::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct EmbedHostBuilder {
    /// Address and timeouts.
    options: EmbedOptions,
    /// Shell callbacks.
    callbacks: HostCallbacks,
}

// ============================================================================
// EmbedHostBuilder Implementation
// ============================================================================

impl EmbedHostBuilder {
    /// Creates a builder with default options and no callbacks.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: EmbedOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the base address.
    ///
    /// # Arguments
    ///
    /// * `address` - e.g. `https://assistant.us.corti.app`
    #[inline]
    #[must_use]
    pub fn base_address(mut self, address: impl Into<String>) -> Self {
        self.options = self.options.with_base_address(address);
        self
    }

    /// Sets the per-command response timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_request_timeout(timeout);
        self
    }

    /// Sets the readiness timeout.
    #[inline]
    #[must_use]
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_ready_timeout(timeout);
        self
    }

    /// Sets the callback fired when the frame signals `ready`.
    #[must_use]
    pub fn on_ready<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_ready = Some(Arc::new(callback));
        self
    }

    /// Sets the callback fired for every inbound event.
    #[must_use]
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
    {
        self.callbacks.on_event = Some(Arc::new(callback));
        self
    }

    /// Sets the callback fired whenever an operation fails.
    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ErrorReport) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Arc::new(callback));
        self
    }

    /// Builds the host, validating the base address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`](crate::Error::InvalidAddress) if
    /// the base address fails validation; `on_error` sees it first.
    pub fn build(self, target: Arc<dyn MessageTarget>) -> Result<EmbedHost> {
        EmbedHost::new(target, self.options, self.callbacks)
    }
}

// ============================================================================
// Tests
// ============================================================================

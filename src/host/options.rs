//! Host configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! use corti_embedded::EmbedOptions;
//!
//! let options = EmbedOptions::new()
//!     .with_base_address("https://assistant.us.corti.app")
//!     .with_request_timeout(Duration::from_secs(5));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::bridge::BridgeOptions;

// ============================================================================
// Constants
// ============================================================================

/// Base address used when none is configured.
pub const DEFAULT_BASE_ADDRESS: &str = "https://assistant.eu.corti.app";

// ============================================================================
// EmbedOptions
// ============================================================================

/// Configuration for an [`EmbedHost`](super::EmbedHost).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Raw base address; validated when the host is built.
    pub base_address: String,

    /// Timeouts for the bridge created on each genuine load.
    pub bridge: BridgeOptions,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbedOptions {
    /// Creates options with the default region and timeouts.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS.to_string(),
            bridge: BridgeOptions::new(),
        }
    }

    /// Sets the base address.
    #[inline]
    #[must_use]
    pub fn with_base_address(mut self, address: impl Into<String>) -> Self {
        self.base_address = address.into();
        self
    }

    /// Sets the per-command response timeout.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.bridge = self.bridge.with_request_timeout(timeout);
        self
    }

    /// Sets the readiness timeout.
    #[inline]
    #[must_use]
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.bridge = self.bridge.with_ready_timeout(timeout);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

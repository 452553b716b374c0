//! Bridge timing configuration.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default time a command waits for its response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time a command waits for the frame to become ready.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// BridgeOptions
// ============================================================================

/// Timeouts applied by a [`Bridge`](super::Bridge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Per-command response timeout.
    pub request_timeout: Duration,
    /// Readiness wait performed before every command.
    pub ready_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeOptions {
    /// Creates options with default timeouts.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    /// Sets the response timeout.
    #[inline]
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the readiness timeout.
    #[inline]
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BridgeOptions::default();
        assert_eq!(options.request_timeout.as_secs(), 10);
        assert_eq!(options.ready_timeout.as_secs(), 30);
    }

    #[test]
    fn test_builder_methods() {
        let options = BridgeOptions::new()
            .with_request_timeout(Duration::from_millis(500))
            .with_ready_timeout(Duration::from_secs(1));
        assert_eq!(options.request_timeout, Duration::from_millis(500));
        assert_eq!(options.ready_timeout, Duration::from_secs(1));
    }
}

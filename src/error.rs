//! Error types for the embedding bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use corti_embedded::{Bridge, Result};
//!
//! async fn example(bridge: &Bridge) -> Result<()> {
//!     bridge.navigate_to("/session/123").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Setup | [`Error::InvalidAddress`], [`Error::NotReady`], [`Error::InvalidArgument`] |
//! | Timing | [`Error::ReadyTimeout`], [`Error::RequestTimeout`] |
//! | Targeting | [`Error::OriginUnresolvable`], [`Error::Transport`] |
//! | Remote | [`Error::RemoteFailure`], [`Error::Protocol`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Every failure surfaces to the immediate caller; nothing is retried
/// internally.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Setup Errors
    // ========================================================================
    /// Base address failed validation.
    ///
    /// Fatal to setup: the host must abort and surface it.
    #[error("Invalid baseURL: {reason}")]
    InvalidAddress {
        /// Which rule the address broke.
        reason: String,
    },

    /// No live transport subscription or frame to talk to.
    ///
    /// Returned when a command is attempted before setup or after teardown.
    #[error("Iframe not ready")]
    NotReady,

    /// A command argument was rejected before sending.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument.
        message: String,
    },

    // ========================================================================
    // Timing Errors
    // ========================================================================
    /// The embedded frame never signaled readiness.
    #[error("Timeout waiting for iframe to be ready after {timeout_ms}ms")]
    ReadyTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// No response arrived for a command in time.
    #[error("Request timeout: {request_id} after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Targeting Errors
    // ========================================================================
    /// The trusted origin for a send could not be determined.
    ///
    /// The message is never sent in this case.
    #[error("Cannot determine trusted origin for postMessage")]
    OriginUnresolvable,

    /// The host transport refused the outbound message.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The embedded side answered with `success: false`.
    ///
    /// Message, code and details are passed through verbatim.
    #[error("{message}")]
    RemoteFailure {
        /// Error message reported by the embedded application.
        message: String,
        /// Machine-readable error code, if any.
        code: Option<String>,
        /// Structured error details, if any.
        details: Option<Value>,
    },

    /// A successful response did not carry what the action promises.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid address error.
    #[inline]
    pub fn invalid_address(reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a ready timeout error.
    #[inline]
    pub fn ready_timeout(timeout_ms: u64) -> Self {
        Self::ReadyTimeout { timeout_ms }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a remote failure error.
    #[inline]
    pub fn remote_failure(
        message: impl Into<String>,
        code: Option<String>,
        details: Option<Value>,
    ) -> Self {
        Self::RemoteFailure {
            message: message.into(),
            code,
            details,
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadyTimeout { .. } | Self::RequestTimeout { .. })
    }

    /// Returns `true` if the embedded side reported the failure.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteFailure { .. })
    }

    /// Returns the remote error code, if any.
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::RemoteFailure { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed if the host retries later.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::ReadyTimeout { .. } | Self::RequestTimeout { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

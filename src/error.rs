//! Error types for the frame bridge.
//!
//! Only internal plumbing and configuration return [`Error`]. The public
//! outbound commands ([`BridgeController::send_nav`], [`BridgeAgent::start`],
//! ...) report failure as `false`, and malformed inbound messages are dropped
//! without producing an error at all.
//!
//! [`BridgeController::send_nav`]: crate::controller::BridgeController::send_nav
//! [`BridgeAgent::start`]: crate::agent::BridgeAgent::start
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Delivery | [`Error::WindowUnavailable`], [`Error::NoTargetOrigin`], [`Error::WindowClosed`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::WindowId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a builder is missing a required collaborator.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// URL could not be parsed or has no usable origin.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser message.
        message: String,
    },

    // ========================================================================
    // Delivery Errors
    // ========================================================================
    /// The tracked frame currently has no content window.
    #[error("Frame has no content window")]
    WindowUnavailable,

    /// Neither a verified nor a statically resolved target origin is known.
    #[error("No target origin available")]
    NoTargetOrigin,

    /// The receiving browsing context has been closed or detached.
    #[error("Window closed: {window_id}")]
    WindowClosed {
        /// The closed window's ID.
        window_id: WindowId,
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
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a window closed error.
    #[inline]
    pub fn window_closed(window_id: WindowId) -> Self {
        Self::WindowClosed { window_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error came from message delivery.
    ///
    /// Delivery errors are expected whenever a frame navigates away or is
    /// torn down; callers may retry once the frame is available again.
    #[inline]
    #[must_use]
    pub fn is_delivery_error(&self) -> bool {
        matches!(
            self,
            Self::WindowUnavailable | Self::NoTargetOrigin | Self::WindowClosed { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

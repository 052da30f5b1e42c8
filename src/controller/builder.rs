//! Builder pattern for controller configuration.
//!
//! # Example
//!
//! ```
//! use frame_bridge::BridgeController;
//! use frame_bridge::origin::Origin;
//! use frame_bridge::transport::{MemoryFrame, MemoryWindow};
//!
//! # fn example() -> frame_bridge::Result<()> {
//! let (host, _inbox) = MemoryWindow::new(Origin::parse("https://host.example")?);
//! let frame = MemoryFrame::new(host.clone());
//!
//! let controller = BridgeController::builder()
//!     .frame(frame)
//!     .host(host)
//!     .target_url("/preview/42")
//!     .base_url("https://host.example/dashboard")
//!     .build()?;
//!
//! let origin = controller.static_origin().map(|o| o.to_string());
//! assert_eq!(origin.as_deref(), Some("https://host.example"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::transport::{FrameRef, MessageTarget};

use super::BridgeController;

// ============================================================================
// ControllerBuilder
// ============================================================================

/// Builder for configuring a [`BridgeController`].
///
/// Use [`BridgeController::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ControllerBuilder {
    /// Frame to track.
    frame: Option<Arc<dyn FrameRef>>,
    /// Window receiving inbound messages.
    host: Option<Arc<dyn MessageTarget>>,
    /// URL loaded into the frame.
    target_url: Option<String>,
    /// Host document location, for relative target URLs.
    base_url: Option<String>,
}

impl fmt::Debug for ControllerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerBuilder")
            .field("frame", &self.frame.is_some())
            .field("host", &self.host.is_some())
            .field("target_url", &self.target_url)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ============================================================================
// ControllerBuilder Implementation
// ============================================================================

impl ControllerBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the frame whose content window is tracked.
    #[inline]
    #[must_use]
    pub fn frame(mut self, frame: Arc<dyn FrameRef>) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Sets the host window inbound listeners are installed on.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: Arc<dyn MessageTarget>) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the URL the frame is pointed at.
    #[inline]
    #[must_use]
    pub fn target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Sets the host document location used to resolve relative targets.
    #[inline]
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds and attaches the controller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the frame, host or target URL is missing.
    pub fn build(self) -> Result<BridgeController> {
        let frame = self.frame.ok_or_else(|| Error::config("frame is required"))?;
        let host = self.host.ok_or_else(|| Error::config("host window is required"))?;
        let target_url = self
            .target_url
            .ok_or_else(|| Error::config("target URL is required"))?;

        Ok(BridgeController::new(frame, host, target_url, self.base_url))
    }
}

// ============================================================================
// Tests
// ============================================================================

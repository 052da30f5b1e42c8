//! Origin resolution.
//!
//! An origin is the scheme + host + port triple browsers use to restrict
//! cross-context delivery. The controller needs one before any message has
//! arrived, so it derives a default from the configured target URL; that
//! default is only ever an outbound target, never proof of trust.
//!
//! # Example
//!
//! ```
//! use frame_bridge::origin::resolve_origin;
//!
//! let origin = resolve_origin("/preview/app", Some("https://host.example:8443/dash"))
//!     .expect("resolvable");
//! assert_eq!(origin.as_str(), "https://host.example:8443");
//!
//! assert!(resolve_origin("http://[::1", None).is_none());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;
use url::{ParseError, Url};

use crate::error::{Error, Result};

// ============================================================================
// Origin
// ============================================================================

/// A tuple origin in its ASCII serialization (`https://app.example:8443`).
///
/// Opaque origins (`null`, `data:` URLs, sandboxed documents) cannot be
/// represented; they are never a valid message target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Origin(String);

impl Origin {
    /// Parses an origin from an origin string or any absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the input does not parse or has an
    /// opaque origin.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| Error::invalid_url(input, e.to_string()))?;
        Self::from_url(&url).ok_or_else(|| Error::invalid_url(input, "opaque origin"))
    }

    /// Returns the origin of a parsed URL, or `None` if it is opaque.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let origin = url.origin();
        origin
            .is_tuple()
            .then(|| Self(origin.ascii_serialization()))
    }

    /// Returns the serialized origin.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Origin {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Origin> for String {
    fn from(value: Origin) -> Self {
        value.0
    }
}

// ============================================================================
// TargetOrigin
// ============================================================================

/// The `targetOrigin` argument of a post: either a specific origin or `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetOrigin {
    /// Deliver regardless of the receiver's origin.
    Any,
    /// Deliver only if the receiver's origin matches exactly.
    Exact(Origin),
}

impl TargetOrigin {
    /// Returns `true` if a receiver with `origin` may see the message.
    #[inline]
    #[must_use]
    pub fn matches(&self, origin: &Origin) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == origin,
        }
    }

    /// Returns the wire form (`*` or the serialized origin).
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Exact(origin) => origin.as_str(),
        }
    }
}

impl From<Origin> for TargetOrigin {
    fn from(value: Origin) -> Self {
        Self::Exact(value)
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves the origin of `target`, relative to `base` when it is relative.
///
/// Returns `None` ("unresolved") for malformed URLs, relative URLs without
/// a base, and opaque origins. Never fails.
#[must_use]
pub fn resolve_origin(target: &str, base: Option<&str>) -> Option<Origin> {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(base?).ok()?;
            base.join(target).ok()?
        }
        Err(e) => {
            trace!(target, error = %e, "Target URL did not resolve to an origin");
            return None;
        }
    };

    Origin::from_url(&url)
}

// ============================================================================
// Tests
// ============================================================================

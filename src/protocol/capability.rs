//! Capabilities advertised by the embedded side in `HELLO`.
//!
//! The capability list is open-ended: new identifiers can appear without a
//! protocol version bump. Known values get their own variant; anything else
//! is kept verbatim in [`Capability::Other`] so it can be forwarded untouched.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Capability
// ============================================================================

/// A named optional feature of the embedded document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    /// In-document back/forward navigation.
    History,
    /// Hash-based routing.
    Hash,
    /// Document title reporting.
    Title,
    /// Navigation to arbitrary in-app locations.
    Deeplink,
    /// Frame resizing.
    Resize,
    /// Screenshot capture.
    Screenshot,
    /// Console log streaming.
    Logs,
    /// Network capture streaming.
    Network,
    /// Element inspection.
    Inspect,
    /// Unrecognized capability, preserved as sent.
    Other(String),
}

/// Set of capabilities attached to a session.
pub type CapabilitySet = BTreeSet<Capability>;

impl Capability {
    /// All capabilities this crate knows how to gate features on.
    pub const KNOWN: [Capability; 9] = [
        Self::History,
        Self::Hash,
        Self::Title,
        Self::Deeplink,
        Self::Resize,
        Self::Screenshot,
        Self::Logs,
        Self::Network,
        Self::Inspect,
    ];

    /// Returns the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::History => "history",
            Self::Hash => "hash",
            Self::Title => "title",
            Self::Deeplink => "deeplink",
            Self::Resize => "resize",
            Self::Screenshot => "screenshot",
            Self::Logs => "logs",
            Self::Network => "network",
            Self::Inspect => "inspect",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for capabilities in the known-safe subset.
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for Capability {
    fn from(value: String) -> Self {
        match value.as_str() {
            "history" => Self::History,
            "hash" => Self::Hash,
            "title" => Self::Title,
            "deeplink" => Self::Deeplink,
            "resize" => Self::Resize,
            "screenshot" => Self::Screenshot,
            "logs" => Self::Logs,
            "network" => Self::Network,
            "inspect" => Self::Inspect,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Capability {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Capability> for String {
    fn from(value: Capability) -> Self {
        match value {
            Capability::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

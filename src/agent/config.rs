//! Agent configuration.
//!
//! # Example
//!
//! ```
//! use frame_bridge::agent::AgentConfig;
//! use frame_bridge::protocol::Capability;
//!
//! let config = AgentConfig::new()
//!     .with_capabilities([Capability::History, Capability::Logs])
//!     .with_referrer("https://host.example/dashboard");
//!
//! assert_eq!(config.host_target().as_str(), "https://host.example");
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::origin::{TargetOrigin, resolve_origin};
use crate::protocol::Capability;

// ============================================================================
// AgentConfig
// ============================================================================

/// Embedded-side configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    /// Capabilities announced in `HELLO`.
    pub capabilities: Vec<Capability>,

    /// URL of the referring (host) document, if the embedded side knows it.
    pub referrer: Option<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl AgentConfig {
    /// Creates a configuration with no capabilities and no referrer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capabilities: Vec::new(),
            referrer: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl AgentConfig {
    /// Adds one capability.
    #[inline]
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Adds several capabilities.
    #[inline]
    #[must_use]
    pub fn with_capabilities<I, C>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Capability>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(Into::into));
        self
    }

    /// Sets the referring document URL.
    #[inline]
    #[must_use]
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }
}

// ============================================================================
// Derived Values
// ============================================================================

impl AgentConfig {
    /// Returns where outbound messages go: the referrer's origin when it
    /// resolves, otherwise any origin.
    #[must_use]
    pub fn host_target(&self) -> TargetOrigin {
        self.referrer
            .as_deref()
            .and_then(|referrer| resolve_origin(referrer, None))
            .map_or(TargetOrigin::Any, TargetOrigin::Exact)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::new();
        assert!(config.capabilities.is_empty());
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.host_target(), TargetOrigin::Any);
    }

    #[test]
    fn test_capabilities_accumulate() {
        let config = AgentConfig::new()
            .with_capability("history")
            .with_capabilities(["logs", "x-custom"]);

        assert_eq!(
            config.capabilities,
            vec![
                Capability::History,
                Capability::Logs,
                Capability::Other("x-custom".into())
            ]
        );
    }

    #[test]
    fn test_unresolvable_referrer_targets_any() {
        let config = AgentConfig::new().with_referrer("about:blank");
        assert_eq!(config.host_target(), TargetOrigin::Any);
    }
}

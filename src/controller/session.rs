//! Bridge session state.

use serde::Serialize;
use tracing::trace;

use crate::identifiers::SessionId;
use crate::origin::Origin;
use crate::protocol::{BridgeMessage, Capability, CapabilitySet};

// ============================================================================
// BridgeState
// ============================================================================

/// Coarse lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    /// No listener installed.
    Unattached,
    /// Attached, no `HELLO` seen yet.
    Unsupported,
    /// `HELLO` seen, agent still initializing.
    Supported,
    /// `READY` seen; the agent accepts commands.
    Ready,
}

// ============================================================================
// BridgeSession
// ============================================================================

/// Bridge state for one (frame, target URL) pairing.
///
/// Consumers get clones of this through
/// [`BridgeController::snapshot`](super::BridgeController::snapshot) and
/// [`BridgeController::subscribe`](super::BridgeController::subscribe).
/// Only the controller's inbound listener mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeSession {
    /// Session identity; `None` while unattached.
    pub id: Option<SessionId>,
    /// A valid `HELLO` has been received.
    pub is_supported: bool,
    /// A valid `READY` has been received after `HELLO`.
    pub is_ready: bool,
    /// Last reported location inside the embedded document.
    pub href: String,
    /// Last reported document title.
    pub title: Option<String>,
    /// Last reported back availability.
    pub can_go_back: bool,
    /// Last reported forward availability.
    pub can_go_forward: bool,
    /// Full capability set from the latest `HELLO`, unknown names included.
    pub capabilities: CapabilitySet,
    /// Target for outbound sends.
    pub trusted_origin: Option<Origin>,
    /// `trusted_origin` was observed on an inbound message rather than
    /// derived from the target URL.
    pub origin_verified: bool,
}

impl BridgeSession {
    /// Creates a session with initial values.
    pub(crate) fn fresh(id: Option<SessionId>, static_origin: Option<Origin>) -> Self {
        Self {
            id,
            is_supported: false,
            is_ready: false,
            href: String::new(),
            title: None,
            can_go_back: false,
            can_go_forward: false,
            capabilities: CapabilitySet::new(),
            trusted_origin: static_origin,
            origin_verified: false,
        }
    }

    /// Returns the derived lifecycle state.
    #[must_use]
    pub fn state(&self) -> BridgeState {
        match (self.id, self.is_supported, self.is_ready) {
            (None, _, _) => BridgeState::Unattached,
            (Some(_), _, true) => BridgeState::Ready,
            (Some(_), true, false) => BridgeState::Supported,
            (Some(_), false, false) => BridgeState::Unsupported,
        }
    }

    /// Returns `true` if the embedded side declared `capability`.
    #[inline]
    #[must_use]
    pub fn supports(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Returns the declared capabilities that are safe to gate UI on.
    #[must_use]
    pub fn gated_capabilities(&self) -> CapabilitySet {
        self.capabilities
            .iter()
            .filter(|cap| cap.is_known())
            .cloned()
            .collect()
    }

    /// Records the origin of a validated inbound message.
    ///
    /// Returns `true` if the trusted origin changed.
    pub(crate) fn adopt_origin(&mut self, origin: Origin) -> bool {
        let changed = !self.origin_verified || self.trusted_origin.as_ref() != Some(&origin);
        self.trusted_origin = Some(origin);
        self.origin_verified = true;
        changed
    }

    /// Applies a validated inbound message. Returns `true` on any change.
    pub(crate) fn apply(&mut self, message: &BridgeMessage) -> bool {
        let before = self.clone();

        match message {
            BridgeMessage::Hello { caps, title } => {
                self.is_supported = true;
                self.capabilities = caps.iter().cloned().collect();
                if title.is_some() {
                    self.title.clone_from(title);
                }
            }

            BridgeMessage::Ready {} => {
                if !self.is_supported {
                    trace!("READY before HELLO ignored");
                    return false;
                }
                self.is_ready = true;
            }

            BridgeMessage::Location {
                href,
                title,
                can_go_back,
                can_go_forward,
            } => {
                if !self.is_supported {
                    trace!("LOCATION before HELLO ignored");
                    return false;
                }
                self.href.clone_from(href);
                if title.is_some() {
                    self.title.clone_from(title);
                }
                self.can_go_back = *can_go_back;
                self.can_go_forward = *can_go_forward;
            }

            // Host-to-embedded messages carry no host state.
            BridgeMessage::Nav { .. } | BridgeMessage::Ping { .. } => {}
        }

        *self != before
    }
}

// ============================================================================
// Tests
// ============================================================================

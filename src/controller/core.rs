//! Core controller struct, lifecycle and inbound message handling.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::identifiers::{ListenerId, SessionId};
use crate::origin::{Origin, resolve_origin};
use crate::protocol::decode;
use crate::transport::{FrameRef, MessageEvent, MessageHandler, MessageTarget};

use super::builder::ControllerBuilder;
use super::session::BridgeSession;

// ============================================================================
// Types
// ============================================================================

/// Target URL and the listener installed for it.
struct Binding {
    target_url: String,
    static_origin: Option<Origin>,
    listener: Option<ListenerId>,
}

/// Shared state between the controller handle and its listener.
pub(crate) struct ControllerInner {
    pub(crate) frame: Arc<dyn FrameRef>,
    host: Arc<dyn MessageTarget>,
    base_url: Option<String>,
    binding: Mutex<Binding>,
    pub(crate) session: Mutex<BridgeSession>,
    state_tx: watch::Sender<BridgeSession>,
}

// ============================================================================
// BridgeController
// ============================================================================

/// Host-side end of the bridge.
///
/// Tracks one frame, validates what it sends, and targets outbound
/// commands at the origin it has actually observed. Dropping the
/// controller removes its listener.
pub struct BridgeController {
    pub(crate) inner: Arc<ControllerInner>,
}

impl fmt::Debug for BridgeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.inner.binding.lock();
        f.debug_struct("BridgeController")
            .field("target_url", &binding.target_url)
            .field("static_origin", &binding.static_origin)
            .field("listener", &binding.listener)
            .finish_non_exhaustive()
    }
}

impl BridgeController {
    /// Returns a builder for a new controller.
    #[inline]
    #[must_use]
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    /// Creates a controller and attaches it.
    pub(crate) fn new(
        frame: Arc<dyn FrameRef>,
        host: Arc<dyn MessageTarget>,
        target_url: String,
        base_url: Option<String>,
    ) -> Self {
        let static_origin = resolve_origin(&target_url, base_url.as_deref());
        if static_origin.is_none() {
            debug!(target_url = %target_url, "No static origin for target URL");
        }

        let (state_tx, _) = watch::channel(BridgeSession::fresh(None, None));

        let controller = Self {
            inner: Arc::new(ControllerInner {
                frame,
                host,
                base_url,
                binding: Mutex::new(Binding {
                    target_url,
                    static_origin,
                    listener: None,
                }),
                session: Mutex::new(BridgeSession::fresh(None, None)),
                state_tx,
            }),
        };

        controller.attach();
        controller
    }
}

// ============================================================================
// BridgeController - State Access
// ============================================================================

impl BridgeController {
    /// Returns a copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> BridgeSession {
        self.inner.session.lock().clone()
    }

    /// Returns a receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BridgeSession> {
        self.inner.state_tx.subscribe()
    }

    /// Returns the configured target URL.
    #[must_use]
    pub fn target_url(&self) -> String {
        self.inner.binding.lock().target_url.clone()
    }

    /// Returns the origin resolved from the target URL, if any.
    #[must_use]
    pub fn static_origin(&self) -> Option<Origin> {
        self.inner.binding.lock().static_origin.clone()
    }
}

// ============================================================================
// BridgeController - Lifecycle
// ============================================================================

impl BridgeController {
    /// Installs a listener for a fresh session.
    ///
    /// Any previously installed listener is removed first.
    pub fn attach(&self) {
        let mut binding = self.inner.binding.lock();
        self.inner.uninstall(&mut binding);

        let session_id = SessionId::generate();
        let fresh = BridgeSession::fresh(Some(session_id), binding.static_origin.clone());
        self.inner.publish_replace(fresh);

        let listener = self.inner.host.add_message_listener(listener_for(
            Arc::downgrade(&self.inner),
            session_id,
        ));
        binding.listener = Some(listener);

        debug!(
            session_id = %session_id,
            %listener,
            target_url = %binding.target_url,
            "Bridge attached"
        );
    }

    /// Removes the listener and clears all session state.
    pub fn detach(&self) {
        let mut binding = self.inner.binding.lock();
        if self.inner.uninstall(&mut binding) {
            self.inner.publish_replace(BridgeSession::fresh(None, None));
            debug!(target_url = %binding.target_url, "Bridge detached");
        }
    }

    /// Discards the session and starts a fresh one for the same target.
    pub fn reset(&self) {
        debug!("Bridge reset");
        self.attach();
    }

    /// Points the controller at a new target URL.
    ///
    /// Does nothing and returns `false` if the URL is unchanged; otherwise
    /// the session is reset against the newly resolved origin.
    pub fn set_target_url(&self, target_url: impl Into<String>) -> bool {
        let target_url = target_url.into();
        {
            let mut binding = self.inner.binding.lock();
            if binding.target_url == target_url {
                return false;
            }
            binding.static_origin = resolve_origin(&target_url, self.inner.base_url.as_deref());
            debug!(
                from = %binding.target_url,
                to = %target_url,
                static_origin = ?binding.static_origin,
                "Target URL changed"
            );
            binding.target_url = target_url;
        }

        self.attach();
        true
    }
}

impl Drop for BridgeController {
    fn drop(&mut self) {
        let mut binding = self.inner.binding.lock();
        self.inner.uninstall(&mut binding);
    }
}

// ============================================================================
// ControllerInner
// ============================================================================

impl ControllerInner {
    /// Removes the installed listener, if any.
    fn uninstall(&self, binding: &mut Binding) -> bool {
        match binding.listener.take() {
            Some(id) => {
                self.host.remove_message_listener(id);
                true
            }
            None => false,
        }
    }

    /// Replaces the whole session and notifies subscribers.
    fn publish_replace(&self, session: BridgeSession) {
        *self.session.lock() = session.clone();
        self.state_tx.send_replace(session);
    }

    /// Validates and applies one inbound message.
    pub(super) fn handle_message(&self, session_id: SessionId, event: &MessageEvent) {
        let Some(window) = self.frame.content_window() else {
            trace!("Message while frame has no content window, dropped");
            return;
        };
        if event.source != Some(window.id()) {
            trace!(source = ?event.source, expected = %window.id(), "Foreign sender, dropped");
            return;
        }

        let Some(message) = decode(&event.data) else {
            trace!("Unrecognized payload, dropped");
            return;
        };

        let Ok(origin) = Origin::parse(&event.origin) else {
            trace!(origin = %event.origin, "Sender origin not targetable, dropped");
            return;
        };

        let mut session = self.session.lock();
        if session.id != Some(session_id) {
            trace!(%session_id, "Message for a previous session, dropped");
            return;
        }

        let was = session.state();
        let origin_changed = session.adopt_origin(origin);
        let state_changed = session.apply(&message);

        if origin_changed {
            debug!(%session_id, origin = ?session.trusted_origin, "Trusted origin adopted");
        }
        if session.state() != was {
            debug!(%session_id, from = ?was, to = ?session.state(), kind = message.kind(), "Bridge state changed");
        }

        if origin_changed || state_changed {
            let snapshot = session.clone();
            drop(session);
            self.state_tx.send_replace(snapshot);
        }
    }
}

/// Builds the listener for one session.
///
/// Holds the controller weakly so an orphaned listener cannot keep it alive.
fn listener_for(inner: Weak<ControllerInner>, session_id: SessionId) -> MessageHandler {
    Arc::new(move |event: &MessageEvent| {
        if let Some(inner) = inner.upgrade() {
            inner.handle_message(session_id, event);
        }
    })
}

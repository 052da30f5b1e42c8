//! Bridge agent running inside the embedded document.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::Result;
use crate::origin::{Origin, TargetOrigin};
use crate::protocol::{BridgeMessage, NavCommand, decode, encode};
use crate::transport::{BrowsingContext, MessageEvent, MessageHandler};

use super::config::AgentConfig;
use super::history::AgentHistory;

// ============================================================================
// BridgeAgent
// ============================================================================

/// Embedded-side end of the bridge.
///
/// Announces itself once, reports every location change, and executes
/// `NAV` commands from the parent window against its own history.
pub struct BridgeAgent {
    parent: Arc<dyn BrowsingContext>,
    history: Arc<dyn AgentHistory>,
    config: AgentConfig,
    host_target: TargetOrigin,
    started: AtomicBool,
    ready_sent: AtomicBool,
    last_ping: Mutex<Option<f64>>,
}

impl fmt::Debug for BridgeAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeAgent")
            .field("parent", &self.parent.id())
            .field("host_target", &self.host_target)
            .field("started", &self.started.load(Ordering::Acquire))
            .field("ready_sent", &self.ready_sent.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl BridgeAgent {
    /// Creates an agent posting to `parent`.
    #[must_use]
    pub fn new(
        parent: Arc<dyn BrowsingContext>,
        history: Arc<dyn AgentHistory>,
        config: AgentConfig,
    ) -> Self {
        let host_target = config.host_target();
        Self {
            parent,
            history,
            config,
            host_target,
            started: AtomicBool::new(false),
            ready_sent: AtomicBool::new(false),
            last_ping: Mutex::new(None),
        }
    }

    /// Returns the origin outbound messages are aimed at.
    #[inline]
    #[must_use]
    pub fn host_target(&self) -> &TargetOrigin {
        &self.host_target
    }

    /// Returns the timestamp of the last `PING` received.
    #[must_use]
    pub fn last_ping(&self) -> Option<f64> {
        *self.last_ping.lock()
    }

    /// Returns a listener to install on the embedded window.
    #[must_use]
    pub fn listener(self: &Arc<Self>) -> MessageHandler {
        let agent = Arc::clone(self);
        Arc::new(move |event: &MessageEvent| agent.handle_message(event))
    }
}

// ============================================================================
// BridgeAgent - Outbound
// ============================================================================

impl BridgeAgent {
    /// Announces the agent with `HELLO`, followed by the current location.
    ///
    /// Runs once per agent; later calls send nothing and return `false`.
    pub fn start(&self) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("Agent already started");
            return false;
        }

        let hello = BridgeMessage::Hello {
            caps: self.config.capabilities.clone(),
            title: self.history.location().title,
        };
        debug!(host = %self.host_target, caps = self.config.capabilities.len(), "Agent starting");

        self.send(&hello) && self.report_location()
    }

    /// Signals readiness with `READY`. Runs once per agent.
    pub fn mark_ready(&self) -> bool {
        if self
            .ready_sent
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("READY already sent");
            return false;
        }
        self.send(&BridgeMessage::ready())
    }

    /// Reports the current location with `LOCATION`.
    pub fn report_location(&self) -> bool {
        let location = self.history.location();
        self.send(&BridgeMessage::Location {
            href: location.href,
            title: location.title,
            can_go_back: location.can_go_back,
            can_go_forward: location.can_go_forward,
        })
    }

    fn send(&self, message: &BridgeMessage) -> bool {
        match self.try_send(message) {
            Ok(()) => true,
            Err(e) => {
                debug!(kind = message.kind(), error = %e, "Agent send failed");
                false
            }
        }
    }

    fn try_send(&self, message: &BridgeMessage) -> Result<()> {
        let data = encode(message)?;
        self.parent.post_message(data, &self.host_target)
    }
}

// ============================================================================
// BridgeAgent - Inbound
// ============================================================================

impl BridgeAgent {
    /// Validates and executes one inbound message.
    ///
    /// Only messages from the parent window (and, when the host origin is
    /// known, from that origin) are considered.
    pub fn handle_message(&self, event: &MessageEvent) {
        if event.source != Some(self.parent.id()) {
            trace!(source = ?event.source, "Agent: foreign sender, dropped");
            return;
        }

        if let TargetOrigin::Exact(expected) = &self.host_target
            && Origin::parse(&event.origin).ok().as_ref() != Some(expected)
        {
            trace!(origin = %event.origin, "Agent: unexpected origin, dropped");
            return;
        }

        let Some(message) = decode(&event.data) else {
            trace!("Agent: unrecognized payload, dropped");
            return;
        };

        match message {
            BridgeMessage::Nav { cmd, to } => self.navigate(cmd, to.as_deref()),
            BridgeMessage::Ping { ts } => {
                *self.last_ping.lock() = Some(ts);
            }
            other => trace!(kind = other.kind(), "Agent: ignoring message"),
        }
    }

    fn navigate(&self, cmd: NavCommand, to: Option<&str>) {
        match (cmd, to) {
            (NavCommand::Back, _) => self.history.back(),
            (NavCommand::Forward, _) => self.history.forward(),
            (NavCommand::Go, Some(href)) => self.history.go(href),
            (NavCommand::Go, None) => {
                trace!("GO without target ignored");
                return;
            }
        }
        debug!(%cmd, "Navigation executed");
        self.report_location();
    }
}

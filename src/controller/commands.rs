//! Outbound commands.
//!
//! Every send is fire-and-forget and reports failure as `false`. None of
//! them touch session state: the agent answers a `NAV` with a fresh
//! `LOCATION`, and that is the only thing that moves `href`.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::origin::{Origin, TargetOrigin};
use crate::protocol::{BridgeMessage, NavCommand, encode};

use super::BridgeController;

// ============================================================================
// BridgeController - Commands
// ============================================================================

impl BridgeController {
    /// Sends a navigation command to the embedded document.
    ///
    /// Returns `false` if the frame has no content window, no target origin
    /// is known, or delivery failed.
    pub fn send_nav(&self, cmd: NavCommand, to: Option<&str>) -> bool {
        self.send(&BridgeMessage::nav(cmd, to.map(str::to_string)))
    }

    /// Asks the embedded document to go back.
    #[inline]
    pub fn go_back(&self) -> bool {
        self.send_nav(NavCommand::Back, None)
    }

    /// Asks the embedded document to go forward.
    #[inline]
    pub fn go_forward(&self) -> bool {
        self.send_nav(NavCommand::Forward, None)
    }

    /// Asks the embedded document to navigate to `href`.
    #[inline]
    pub fn navigate_to(&self, href: &str) -> bool {
        self.send_nav(NavCommand::Go, Some(href))
    }

    /// Sends a liveness ping stamped with the current time.
    pub fn send_ping(&self) -> bool {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or_default();
        self.send(&BridgeMessage::Ping { ts })
    }

    /// Returns the origin outbound messages are currently sent to.
    ///
    /// The observed origin wins over the one derived from the target URL.
    #[must_use]
    pub fn target_origin(&self) -> Option<Origin> {
        let trusted = self.inner.session.lock().trusted_origin.clone();
        trusted.or_else(|| self.static_origin())
    }

    fn send(&self, message: &BridgeMessage) -> bool {
        match self.try_send(message) {
            Ok(()) => {
                trace!(kind = message.kind(), "Message posted");
                true
            }
            Err(e) => {
                debug!(kind = message.kind(), error = %e, "Send failed");
                false
            }
        }
    }

    fn try_send(&self, message: &BridgeMessage) -> Result<()> {
        let window = self
            .inner
            .frame
            .content_window()
            .ok_or(Error::WindowUnavailable)?;
        let target = self.target_origin().ok_or(Error::NoTargetOrigin)?;
        let data = encode(message)?;

        window.post_message(data, &TargetOrigin::Exact(target))
    }
}

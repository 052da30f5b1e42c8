//! Browsing-context transport layer.
//!
//! The bridge never touches a real DOM. It talks to browsing contexts
//! through three small traits, so the same controller and agent run over a
//! browser binding or over the in-memory contexts in [`memory`].
//!
//! | Trait | Browser analogue |
//! |-------|------------------|
//! | [`BrowsingContext`] | `Window` you can `postMessage` to |
//! | [`FrameRef`] | `<iframe>` element ref (`contentWindow` may be `null`) |
//! | [`MessageTarget`] | `addEventListener("message")` / `removeEventListener` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `memory` | In-process browsing contexts and their event loops |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::{ListenerId, WindowId};
use crate::origin::TargetOrigin;

// ============================================================================
// Submodules
// ============================================================================

/// In-memory browsing contexts.
pub mod memory;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{EventLoop, Inbox, MemoryFrame, MemoryPort, MemoryWindow, spawn_event_loop};

// ============================================================================
// MessageEvent
// ============================================================================

/// A delivered cross-context message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// Window that posted the message, if it could be identified.
    pub source: Option<WindowId>,
    /// Origin the browser reports for the sender (may be `"null"`).
    pub origin: String,
    /// Structured-clone payload.
    pub data: Value,
}

/// Callback invoked for each delivered message.
pub type MessageHandler = Arc<dyn Fn(&MessageEvent) + Send + Sync>;

// ============================================================================
// Traits
// ============================================================================

/// A browsing context messages can be posted to.
pub trait BrowsingContext: Send + Sync {
    /// Identity of the receiving window.
    fn id(&self) -> WindowId;

    /// Posts `data` to this context.
    ///
    /// A mismatched `target_origin` is not an error: the message is
    /// silently discarded, exactly as a browser does.
    ///
    /// # Errors
    ///
    /// Returns an error if the context is closed or unreachable.
    fn post_message(&self, data: Value, target_origin: &TargetOrigin) -> Result<()>;
}

/// Non-owning handle to a frame element.
///
/// The frame's document can be swapped or removed at any time, so every
/// lookup may come back empty.
pub trait FrameRef: Send + Sync {
    /// Returns the frame's current content window, if any.
    fn content_window(&self) -> Option<Arc<dyn BrowsingContext>>;
}

/// A window that inbound message listeners can be attached to.
pub trait MessageTarget: Send + Sync {
    /// Installs a listener and returns its handle.
    fn add_message_listener(&self, handler: MessageHandler) -> ListenerId;

    /// Removes a listener. Returns `false` if it was not installed.
    fn remove_message_listener(&self, id: ListenerId) -> bool;
}

//! Frame Bridge - cross-origin bridge between a host page and a framed app.
//!
//! A host document embeds an application from another origin in a frame.
//! The two sides cannot touch each other's internals; the only thing that
//! crosses the boundary is an asynchronous structured message channel. This
//! crate defines that channel's protocol and both of its ends.
//!
//! # Architecture
//!
//! - **Embedded side ([`BridgeAgent`])**: announces itself with `HELLO`,
//!   signals `READY`, reports `LOCATION` changes, executes `NAV` commands
//! - **Host side ([`BridgeController`])**: validates every inbound message,
//!   tracks session state, and sends commands to the origin it has observed
//!
//! Key design principles:
//!
//! - Malformed, unknown or future-version messages are silently ignored
//! - Only messages from the tracked frame's content window are processed
//! - Origin ratchet: an observed sender origin replaces the statically
//!   resolved one and is never downgraded within a session
//! - `LOCATION` is the single source of truth; sending `NAV` changes nothing
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use frame_bridge::agent::{AgentConfig, MemoryHistory};
//! use frame_bridge::origin::Origin;
//! use frame_bridge::transport::{MemoryFrame, MemoryWindow, MessageTarget};
//! use frame_bridge::{BridgeAgent, BridgeController, BridgeState, Result};
//!
//! fn main() -> Result<()> {
//!     let (host, mut host_inbox) = MemoryWindow::new(Origin::parse("https://host.example")?);
//!     let (app, mut app_inbox) = MemoryWindow::new(Origin::parse("https://app.example")?);
//!
//!     // Host renders a frame pointing at the app.
//!     let frame = MemoryFrame::new(host.clone());
//!     frame.load(app.clone());
//!     let controller = BridgeController::builder()
//!         .frame(frame)
//!         .host(host.clone())
//!         .target_url("https://app.example/")
//!         .build()?;
//!
//!     // The app boots its agent.
//!     let agent = Arc::new(BridgeAgent::new(
//!         Arc::new(app.port_to(&host)),
//!         Arc::new(MemoryHistory::new("/")),
//!         AgentConfig::new().with_capability("history"),
//!     ));
//!     app.add_message_listener(agent.listener());
//!     agent.start();
//!     agent.mark_ready();
//!     host_inbox.dispatch_pending();
//!     assert_eq!(controller.snapshot().state(), BridgeState::Ready);
//!
//!     // Host drives navigation; the agent answers with LOCATION.
//!     controller.navigate_to("/pricing");
//!     app_inbox.dispatch_pending();
//!     host_inbox.dispatch_pending();
//!     assert_eq!(controller.snapshot().href, "/pricing");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | Embedded side: [`BridgeAgent`], history |
//! | [`controller`] | Host side: [`BridgeController`], session state |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`origin`] | Origin parsing and resolution |
//! | [`protocol`] | Message schema and wire codec |
//! | [`transport`] | Browsing-context traits and in-memory contexts |

// ============================================================================
// Modules
// ============================================================================

/// Embedded-side agent.
pub mod agent;

/// Host-side controller.
///
/// Use [`BridgeController::builder()`] to create a configured controller.
pub mod controller;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Origin parsing and resolution.
pub mod origin;

/// Bridge message types.
pub mod protocol;

/// Browsing-context transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Endpoint types
pub use agent::{AgentConfig, AgentHistory, BridgeAgent};
pub use controller::{BridgeController, BridgeSession, BridgeState, ControllerBuilder};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ListenerId, SessionId, WindowId};

// Protocol types
pub use origin::{Origin, TargetOrigin};
pub use protocol::{BridgeMessage, Capability, NavCommand, PROTOCOL_VERSION};

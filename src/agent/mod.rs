//! Embedded-side bridge agent.
//!
//! The agent lives in the framed document and keeps the host informed:
//!
//! - [`BridgeAgent::start`] sends exactly one `HELLO` (plus the initial
//!   `LOCATION`), guarded by a one-time bootstrap flag.
//! - [`BridgeAgent::mark_ready`] sends exactly one `READY`.
//! - [`BridgeAgent::report_location`] is called on every navigation.
//! - Incoming `NAV` commands are run against [`AgentHistory`] and always
//!   answered with a fresh `LOCATION`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use frame_bridge::agent::{AgentConfig, BridgeAgent, MemoryHistory};
//! use frame_bridge::origin::Origin;
//! use frame_bridge::transport::{MemoryWindow, MessageTarget};
//!
//! # fn example() -> frame_bridge::Result<()> {
//! let (host, _host_inbox) = MemoryWindow::new(Origin::parse("https://host.example")?);
//! let (app, _app_inbox) = MemoryWindow::new(Origin::parse("https://app.example")?);
//!
//! let agent = Arc::new(BridgeAgent::new(
//!     Arc::new(app.port_to(&host)),
//!     Arc::new(MemoryHistory::new("/")),
//!     AgentConfig::new()
//!         .with_capability("history")
//!         .with_referrer("https://host.example/"),
//! ));
//! app.add_message_listener(agent.listener());
//!
//! assert!(agent.start());
//! assert!(!agent.start());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod config;
mod core;
mod history;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AgentConfig;
pub use core::BridgeAgent;
pub use history::{AgentHistory, LocationSnapshot, MemoryHistory};

// ============================================================================
// Tests
// ============================================================================

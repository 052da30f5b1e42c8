//! Bridge protocol message types.
//!
//! This module defines the messages exchanged between the host document
//! (controller) and the embedded document (agent).
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `HELLO` | Embedded → Host | Announce presence and capabilities |
//! | `READY` | Embedded → Host | Initialization finished |
//! | `LOCATION` | Embedded → Host | Navigable location changed |
//! | `NAV` | Host → Embedded | Navigate back/forward/to a location |
//! | `PING` | Host → Embedded | Liveness probe |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `capability` | Open-ended capability identifiers |
//! | `message` | Message enum, versioned encode/decode |

// ============================================================================
// Submodules
// ============================================================================

/// Capability identifiers.
pub mod capability;

/// Message definitions and wire codec.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use capability::{Capability, CapabilitySet};
pub use message::{BridgeMessage, NavCommand, PROTOCOL_VERSION, decode, decode_str, encode};

//! Shared types for the Pearl sync protocol
//!
//! Common types used on both sides of the wire: order snapshots and
//! events, the sync request/response pair, and the push-channel message
//! envelope.

pub mod message;
pub mod order;
pub mod sync;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Push-channel re-exports (for convenient access)
pub use message::{PushMessage, PushRoute, PushTopic};

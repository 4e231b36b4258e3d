//! Pearl Sync - order state synchronization client
//!
//! Keeps a local, in-memory mirror of active orders consistent with the
//! authoritative order service over an intermittently-disconnected
//! transport: a request/response sync call plus a push-event channel.
//!
//! The client is deliberately dumb: it never recomputes order state
//! from events, it only applies server-provided snapshots. On any
//! detected inconsistency (sequence gap, epoch change, lost channel) it
//! falls back to a full resync rather than patching around the gap.

pub mod config;
pub mod controller;
pub mod error;
pub mod listener;
pub mod store;
pub mod transport;

pub use config::SyncConfig;
pub use controller::SyncController;
pub use error::{ApplyError, SyncError, SyncResult, TransportError};
pub use listener::PushListener;
pub use store::{ConnectionState, OrderStore};
pub use transport::SyncTransport;

// Re-export shared types for convenience
pub use shared::message::{ChannelStatus, OrderDeltaPayload, PushMessage, ResyncRequestPayload};
pub use shared::order::{OrderEvent, OrderSnapshot};
pub use shared::sync::{SyncRequest, SyncResponse};

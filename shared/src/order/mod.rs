//! Order domain types (server-authoritative model)
//!
//! The order service owns all state computation. Clients receive:
//! - Events: immutable facts describing one state transition
//! - Snapshots: fully-computed order state replacing prior state
//!
//! Clients never derive totals or status from events; events exist only
//! for audit and timeline display.

pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use event::{EventPayload, OrderEvent, OrderEventKind};
pub use snapshot::{OrderSnapshot, OrderStatus};
pub use types::*;

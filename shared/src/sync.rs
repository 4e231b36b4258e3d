//! Sync protocol types for order reconnection
//!
//! A client that has just started or reconnected calls the order
//! service's sync operation and receives the complete set of active
//! orders plus the server's current sequence and epoch. Events ride
//! along for timeline display only - they are never replayed to
//! rebuild state.

use crate::order::{OrderEvent, OrderSnapshot};
use serde::{Deserialize, Serialize};

/// Sync request from client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Client's last known sequence number
    ///
    /// This client always sends 0 (full sync); the field exists for
    /// forward compatibility.
    pub since_sequence: u64,
}

/// Sync response to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Current active order snapshots
    pub active_orders: Vec<OrderSnapshot>,
    /// Recent events (for timeline display only)
    pub events: Vec<OrderEvent>,
    /// Server's current sequence number
    pub server_sequence: u64,
    /// Server log generation
    /// If this differs from the client's cached epoch, the cached
    /// sequence number is meaningless
    pub server_epoch: u64,
}

impl SyncResponse {
    /// Create a full sync response
    pub fn full(
        active_orders: Vec<OrderSnapshot>,
        server_sequence: u64,
        server_epoch: u64,
    ) -> Self {
        Self {
            active_orders,
            events: vec![],
            server_sequence,
            server_epoch,
        }
    }

    /// Attach timeline events
    pub fn with_events(mut self, events: Vec<OrderEvent>) -> Self {
        self.events = events;
        self
    }
}

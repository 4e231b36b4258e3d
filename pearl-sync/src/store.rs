//! Active-order store
//!
//! The single in-memory mirror of currently active orders plus sync
//! metadata (connection state, last known sequence, last known epoch,
//! initialization flag). Writes are restricted to the sync controller
//! and the push listener; everything else reads.
//!
//! `full_sync` and `apply_order_sync` are the only paths that change
//! the order table, and each mutation runs to completion under the
//! store lock, which is never held across an await point.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use shared::order::{OrderEvent, OrderSnapshot};

use crate::error::ApplyError;

/// Events retained for the audit timeline; oldest dropped first
const TIMELINE_CAP: usize = 1000;

/// Connection state as visible to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Syncing,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Syncing => write!(f, "syncing"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    orders: HashMap<String, OrderSnapshot>,
    timeline: VecDeque<OrderEvent>,
    connection_state: ConnectionState,
    server_sequence: u64,
    server_epoch: u64,
    initialized: bool,
}

/// Shared handle to the active-order store
///
/// Cloning is cheap; all clones observe the same state. Constructed
/// once and injected into the controller and listener - there is no
/// global instance.
#[derive(Debug, Clone)]
pub struct OrderStore {
    inner: Arc<Mutex<StoreInner>>,
    conn_tx: Arc<watch::Sender<ConnectionState>>,
}

impl OrderStore {
    /// Create an empty, uninitialized store
    pub fn new() -> Self {
        let (conn_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Mutex::new(StoreInner::default())),
            conn_tx: Arc::new(conn_tx),
        }
    }

    // ============ Read surface ============

    /// All active orders, sorted by start time for stable display
    pub fn active_orders(&self) -> Vec<OrderSnapshot> {
        let inner = self.inner.lock().unwrap();
        let mut orders: Vec<OrderSnapshot> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        orders
    }

    /// Look up a single order by ID
    pub fn order(&self, order_id: &str) -> Option<OrderSnapshot> {
        self.inner.lock().unwrap().orders.get(order_id).cloned()
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.lock().unwrap().connection_state
    }

    /// Whether the initial full sync has completed
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().unwrap().initialized
    }

    /// Last known server sequence
    pub fn server_sequence(&self) -> u64 {
        self.inner.lock().unwrap().server_sequence
    }

    /// Last known server epoch
    pub fn server_epoch(&self) -> u64 {
        self.inner.lock().unwrap().server_epoch
    }

    /// Recent events (bounded), oldest first
    pub fn timeline(&self) -> Vec<OrderEvent> {
        self.inner.lock().unwrap().timeline.iter().cloned().collect()
    }

    /// Timeline entries for a single order, oldest first
    pub fn events_for_order(&self, order_id: &str) -> Vec<OrderEvent> {
        self.inner
            .lock()
            .unwrap()
            .timeline
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Observe connection-state changes (UI banner)
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.conn_tx.subscribe()
    }

    // ============ Privileged mutation surface ============
    //
    // Crate-private: only the sync controller and the push listener
    // may write. Each operation is a total replace-or-merge - no field
    // of an order snapshot is ever computed locally.

    /// Replace the entire order table with authoritative server state
    ///
    /// Idempotent and safe to call repeatedly; this is the only path
    /// that changes the stored epoch.
    pub(crate) fn full_sync(
        &self,
        orders: Vec<OrderSnapshot>,
        server_sequence: u64,
        server_epoch: u64,
        events: Vec<OrderEvent>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.orders = orders
            .into_iter()
            .map(|o| (o.order_id.clone(), o))
            .collect();
        inner.server_sequence = server_sequence;
        inner.server_epoch = server_epoch;
        for event in events {
            push_timeline(&mut inner, event);
        }
        inner.connection_state = ConnectionState::Connected;
        let order_count = inner.orders.len();
        drop(inner);

        self.conn_tx.send_replace(ConnectionState::Connected);
        tracing::info!(
            orders = order_count,
            server_sequence,
            server_epoch,
            "Full sync applied"
        );
    }

    /// Apply one live delta: validate, then upsert the snapshot
    ///
    /// Rejection mutates nothing; the caller must fall back to a full
    /// sync. This function itself never resyncs.
    pub(crate) fn apply_order_sync(
        &self,
        event: OrderEvent,
        snapshot: OrderSnapshot,
    ) -> Result<(), ApplyError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.initialized {
            return Err(ApplyError::NotInitialized);
        }
        if event.epoch != inner.server_epoch {
            return Err(ApplyError::EpochMismatch {
                expected: inner.server_epoch,
                got: event.epoch,
            });
        }
        let expected = inner.server_sequence + 1;
        if event.sequence != expected {
            return Err(ApplyError::SequenceGap {
                expected,
                got: event.sequence,
            });
        }

        if snapshot.is_terminal() {
            inner.orders.remove(&snapshot.order_id);
        } else {
            inner.orders.insert(snapshot.order_id.clone(), snapshot);
        }
        inner.server_sequence = event.sequence;
        let sequence = event.sequence;
        let order_id = event.order_id.clone();
        push_timeline(&mut inner, event);
        drop(inner);

        tracing::debug!(sequence, order_id = %order_id, "Order delta applied");
        Ok(())
    }

    /// Set the connection state
    ///
    /// Entering `Disconnected` never clears the order table: the UI
    /// keeps showing last known state, marked stale.
    pub(crate) fn set_connection_state(&self, state: ConnectionState) {
        let mut inner = self.inner.lock().unwrap();
        if inner.connection_state == state {
            return;
        }
        inner.connection_state = state;
        drop(inner);

        self.conn_tx.send_replace(state);
        tracing::info!(state = %state, "Connection state changed");
    }

    /// Mark the initial full sync as done
    pub(crate) fn set_initialized(&self, initialized: bool) {
        self.inner.lock().unwrap().initialized = initialized;
    }

    /// Clear everything (logout / tenant switch)
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = StoreInner::default();
        drop(inner);

        self.conn_tx.send_replace(ConnectionState::Disconnected);
        tracing::info!("Order store reset");
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Append to the timeline, skipping events already recorded
///
/// The skip keeps `full_sync` idempotent when the server resends the
/// same recent events.
fn push_timeline(inner: &mut StoreInner, event: OrderEvent) {
    if inner.timeline.iter().any(|e| e.event_id == event.event_id) {
        return;
    }
    inner.timeline.push_back(event);
    if inner.timeline.len() > TIMELINE_CAP {
        inner.timeline.pop_front();
    }
}

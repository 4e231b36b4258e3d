//! Sync client demo against an in-memory order service
//!
//! Demonstrates the full client stack:
//! 1. Cold-start full sync
//! 2. Live order deltas over the push channel
//! 3. Server-initiated full resync
//!
//! Run: cargo run --example sync_demo

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use pearl_sync::{
    OrderDeltaPayload, OrderStore, PushListener, PushMessage, SyncConfig, SyncController,
    SyncResponse, SyncTransport, TransportError,
};
use shared::order::{EventPayload, OrderEvent, OrderEventKind, OrderSnapshot};

/// Minimal in-memory order service
#[derive(Clone)]
struct DemoService {
    state: Arc<Mutex<(Vec<OrderSnapshot>, u64, u64)>>,
    push_tx: broadcast::Sender<PushMessage>,
}

impl DemoService {
    fn new() -> Self {
        let (push_tx, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new((Vec::new(), 0, 1))),
            push_tx,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.push_tx.subscribe()
    }

    fn open_order(&self, order_id: &str, table_name: &str, push: bool) {
        let mut state = self.state.lock().unwrap();
        state.1 += 1;

        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        snapshot.table_name = Some(table_name.to_string());
        snapshot.last_sequence = state.1;

        let event = OrderEvent::new(
            state.1,
            state.2,
            order_id.to_string(),
            "op-1".to_string(),
            "Demo Operator".to_string(),
            OrderEventKind::Opened,
            EventPayload::Opened {
                table_id: None,
                table_name: Some(table_name.to_string()),
                guest_count: 2,
                is_retail: false,
                receipt_number: format!("RCP-{:04}", state.1),
            },
        );

        state.0.push(snapshot.clone());
        drop(state);

        if push {
            let _ = self
                .push_tx
                .send(PushMessage::order_delta(&OrderDeltaPayload { event, snapshot }));
        }
    }
}

#[async_trait]
impl SyncTransport for DemoService {
    async fn sync_since(&self, _since_sequence: u64) -> Result<SyncResponse, TransportError> {
        let state = self.state.lock().unwrap();
        Ok(SyncResponse::full(state.0.clone(), state.1, state.2))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let service = DemoService::new();
    service.open_order("order-1", "A1", false);
    service.open_order("order-2", "A2", false);

    let store = OrderStore::new();
    let controller = Arc::new(SyncController::new(
        service.clone(),
        store.clone(),
        SyncConfig::new(),
    ));
    let listener = PushListener::spawn(service.subscribe(), store.clone(), controller.clone());

    // 1. Cold start
    controller.initialize().await.expect("initial sync failed");
    println!(
        "After startup: {} active orders at sequence {}",
        store.active_orders().len(),
        store.server_sequence()
    );

    // 2. Live delta
    service.open_order("order-3", "B1", true);
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!(
        "After live delta: {} active orders at sequence {}",
        store.active_orders().len(),
        store.server_sequence()
    );

    for order in store.active_orders() {
        println!(
            "  {} @ {} (receipt {:?})",
            order.order_id,
            order.table_name.as_deref().unwrap_or("-"),
            order.receipt_number
        );
    }

    listener.shutdown().await;
}

// pearl-sync/tests/sync_client.rs
// 集成测试：内存版订单服务 + 完整客户端栈

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use pearl_sync::{
    ChannelStatus, ConnectionState, OrderDeltaPayload, OrderStore, PushListener, PushMessage,
    ResyncRequestPayload, SyncConfig, SyncController, SyncResponse, SyncTransport, TransportError,
};
use shared::order::{EventPayload, OrderEvent, OrderEventKind, OrderSnapshot, OrderStatus};

struct ServiceState {
    orders: Vec<OrderSnapshot>,
    sequence: u64,
    epoch: u64,
    fail_syncs: u32,
    sync_calls: u32,
}

/// In-memory stand-in for the order service
///
/// Owns authoritative state, answers sync calls, and pushes deltas the
/// way the edge server broadcasts them to connected clients.
#[derive(Clone)]
struct InMemoryOrderService {
    state: Arc<Mutex<ServiceState>>,
    push_tx: broadcast::Sender<PushMessage>,
}

impl InMemoryOrderService {
    fn new() -> Self {
        let (push_tx, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(ServiceState {
                orders: Vec::new(),
                sequence: 0,
                epoch: 1,
                fail_syncs: 0,
                sync_calls: 0,
            })),
            push_tx,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.push_tx.subscribe()
    }

    /// Make the next `n` sync calls fail with a connection error
    fn fail_next_syncs(&self, n: u32) {
        self.state.lock().unwrap().fail_syncs = n;
    }

    fn sync_calls(&self) -> u32 {
        self.state.lock().unwrap().sync_calls
    }

    fn make_event(
        state: &ServiceState,
        order_id: &str,
        kind: OrderEventKind,
        payload: EventPayload,
    ) -> OrderEvent {
        OrderEvent::new(
            state.sequence,
            state.epoch,
            order_id.to_string(),
            "op-1".to_string(),
            "Integration Operator".to_string(),
            kind,
            payload,
        )
    }

    /// Open an order and broadcast the delta
    fn open_order(&self, order_id: &str, table_name: &str) {
        let delta = self.open_order_internal(order_id, table_name);
        let _ = self.push_tx.send(PushMessage::order_delta(&delta));
    }

    /// Open an order WITHOUT broadcasting (events missed by the client)
    fn open_order_silently(&self, order_id: &str, table_name: &str) {
        self.open_order_internal(order_id, table_name);
    }

    fn open_order_internal(&self, order_id: &str, table_name: &str) -> OrderDeltaPayload {
        let mut state = self.state.lock().unwrap();
        state.sequence += 1;

        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        snapshot.table_name = Some(table_name.to_string());
        snapshot.receipt_number = Some(format!("RCP-{:04}", state.sequence));
        snapshot.last_sequence = state.sequence;

        let event = Self::make_event(
            &state,
            order_id,
            OrderEventKind::Opened,
            EventPayload::Opened {
                table_id: None,
                table_name: Some(table_name.to_string()),
                guest_count: 2,
                is_retail: false,
                receipt_number: snapshot.receipt_number.clone().unwrap(),
            },
        );

        state.orders.push(snapshot.clone());
        OrderDeltaPayload { event, snapshot }
    }

    /// Complete an order and broadcast the terminal delta
    fn complete_order(&self, order_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.sequence += 1;

        let index = state
            .orders
            .iter()
            .position(|o| o.order_id == order_id)
            .expect("completing unknown order");
        let mut snapshot = state.orders.remove(index);
        snapshot.status = OrderStatus::Completed;
        snapshot.last_sequence = state.sequence;

        let event = Self::make_event(
            &state,
            order_id,
            OrderEventKind::Completed,
            EventPayload::Completed {
                receipt_number: snapshot.receipt_number.clone().unwrap_or_default(),
                final_total: snapshot.total,
                payments: snapshot.payments.clone(),
            },
        );
        drop(state);

        let _ = self
            .push_tx
            .send(PushMessage::order_delta(&OrderDeltaPayload { event, snapshot }));
    }

    /// Simulate a service restart: log reset, epoch bump
    fn restart(&self) {
        let mut state = self.state.lock().unwrap();
        state.epoch += 1;
        state.sequence = 0;
        state.orders.clear();
    }

    /// Push the resync-request a restarted server sends to all clients
    fn request_resync(&self) {
        let _ = self
            .push_tx
            .send(PushMessage::resync_request(&ResyncRequestPayload {
                since_sequence: 0,
            }));
    }
}

#[async_trait]
impl SyncTransport for InMemoryOrderService {
    async fn sync_since(&self, _since_sequence: u64) -> Result<SyncResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.sync_calls += 1;
        if state.fail_syncs > 0 {
            state.fail_syncs -= 1;
            return Err(TransportError::Connection("service unreachable".to_string()));
        }
        Ok(SyncResponse::full(
            state.orders.clone(),
            state.sequence,
            state.epoch,
        ))
    }
}

fn fast_config() -> SyncConfig {
    SyncConfig::new()
        .with_base_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(5))
}

fn client_stack(
    service: &InMemoryOrderService,
) -> (
    OrderStore,
    Arc<SyncController<InMemoryOrderService>>,
    PushListener,
) {
    let store = OrderStore::new();
    let controller = Arc::new(SyncController::new(
        service.clone(),
        store.clone(),
        fast_config(),
    ));
    let listener = PushListener::spawn(service.subscribe(), store.clone(), controller.clone());
    (store, controller, listener)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_startup_then_live_deltas() {
    let service = InMemoryOrderService::new();
    service.open_order_silently("order-1", "A1");
    service.open_order_silently("order-2", "A2");

    let (store, controller, listener) = client_stack(&service);
    controller.initialize().await.unwrap();

    assert!(store.is_initialized());
    assert_eq!(store.connection_state(), ConnectionState::Connected);
    assert_eq!(store.active_orders().len(), 2);
    assert_eq!(store.server_sequence(), 2);
    assert_eq!(store.server_epoch(), 1);

    // Live delta: a third table opens
    service.open_order("order-3", "B1");
    wait_until(|| store.order("order-3").is_some()).await;
    assert_eq!(store.server_sequence(), 3);

    // Terminal delta: first order completes and leaves the table
    service.complete_order("order-1");
    wait_until(|| store.order("order-1").is_none()).await;
    assert_eq!(store.active_orders().len(), 2);

    // Timeline kept the live events for audit display
    assert_eq!(store.events_for_order("order-3").len(), 1);
    assert_eq!(store.events_for_order("order-1").len(), 1);

    listener.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_reconnects_with_backoff() {
    let service = InMemoryOrderService::new();
    service.open_order_silently("order-1", "A1");

    let (store, controller, listener) = client_stack(&service);
    controller.initialize().await.unwrap();
    let calls_after_init = service.sync_calls();

    // Orders change while the client is cut off, then the channel
    // reports the disconnect; the next two sync attempts still fail
    service.open_order_silently("order-2", "A2");
    service.fail_next_syncs(2);
    let _ = service
        .push_tx
        .send(PushMessage::connection_status(ChannelStatus::Disconnected));

    wait_until(|| store.connection_state() == ConnectionState::Connected).await;
    // Two failures plus the succeeding full sync
    assert_eq!(service.sync_calls(), calls_after_init + 3);
    assert_eq!(controller.reconnect_attempts(), 0);

    // The missed order arrived via the full resync, not via replay
    assert!(store.order("order-2").is_some());
    assert_eq!(store.server_sequence(), 2);

    listener.shutdown().await;
}

#[tokio::test]
async fn test_gap_in_push_stream_forces_full_sync() {
    let service = InMemoryOrderService::new();
    service.open_order_silently("order-1", "A1");

    let (store, controller, listener) = client_stack(&service);
    controller.initialize().await.unwrap();
    assert_eq!(store.server_sequence(), 1);

    // One delta never reaches the client; the next one exposes the gap
    service.open_order_silently("order-2", "A2");
    service.open_order("order-3", "B1");

    wait_until(|| store.server_sequence() == 3).await;
    // Recovered through a full sync: both missed and pushed orders present
    assert!(store.order("order-2").is_some());
    assert!(store.order("order-3").is_some());
    assert_eq!(store.connection_state(), ConnectionState::Connected);

    listener.shutdown().await;
}

#[tokio::test]
async fn test_server_restart_resync_request() {
    let service = InMemoryOrderService::new();
    service.open_order_silently("order-1", "A1");

    let (store, controller, listener) = client_stack(&service);
    controller.initialize().await.unwrap();
    assert_eq!(store.server_epoch(), 1);

    // Server restarts: log reset, epoch advanced, fresh orders
    service.restart();
    service.open_order_silently("order-9", "C1");
    service.request_resync();

    wait_until(|| store.server_epoch() == 2).await;
    assert!(store.order("order-1").is_none());
    assert!(store.order("order-9").is_some());
    assert_eq!(store.server_sequence(), 1);

    listener.shutdown().await;
}

#[tokio::test]
async fn test_reset_on_logout() {
    let service = InMemoryOrderService::new();
    service.open_order_silently("order-1", "A1");

    let (store, controller, listener) = client_stack(&service);
    controller.initialize().await.unwrap();
    assert_eq!(store.active_orders().len(), 1);

    listener.shutdown().await;
    store.reset();

    assert!(store.active_orders().is_empty());
    assert!(!store.is_initialized());
    assert_eq!(store.connection_state(), ConnectionState::Disconnected);
}

//! Push listener multiplexer
//!
//! 单任务消费推送通道：三类推送依次转成 store 写入或 controller
//! 动作，串行执行，显式保持单写者不变量。任务之外不持有任何状态，
//! 订阅随 shutdown 一并释放。

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shared::message::{ChannelStatus, PushMessage, PushRoute};

use crate::controller::SyncController;
use crate::error::ApplyError;
use crate::store::{ConnectionState, OrderStore};
use crate::transport::SyncTransport;

/// Push listener handle
///
/// Owns the consumer task; dropping without `shutdown()` leaves the
/// task running until the channel closes.
pub struct PushListener {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl PushListener {
    /// Spawn the consumer task over a push-channel subscription
    pub fn spawn<T: SyncTransport + 'static>(
        mut receiver: broadcast::Receiver<PushMessage>,
        store: OrderStore,
        controller: Arc<SyncController<T>>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("Push listener cancelled");
                        break;
                    }
                    message = receiver.recv() => match message {
                        Ok(message) => dispatch(message, &store, &controller).await,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            // 错过的消息无法补回，按检测到间隙处理
                            tracing::warn!(missed, "Push channel lagged; forcing full resync");
                            store.set_connection_state(ConnectionState::Disconnected);
                            controller.reconnect_with_retry().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Push channel closed; listener exiting");
                            break;
                        }
                    },
                }
            }
        });

        Self { handle, cancel }
    }

    /// Stop the consumer task and wait for it to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }

    /// Whether the consumer task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Route one push message to the store or the controller
async fn dispatch<T: SyncTransport>(
    message: PushMessage,
    store: &OrderStore,
    controller: &SyncController<T>,
) {
    match PushRoute::from_message(message) {
        PushRoute::OrderDelta(delta) => {
            let sequence = delta.event.sequence;
            match store.apply_order_sync(delta.event, delta.snapshot) {
                Ok(()) => {}
                Err(error @ ApplyError::NotInitialized) => {
                    // 单写者启动顺序被破坏，属编程错误，不用重同步掩盖
                    tracing::error!(error = %error, "Order delta received before initialization");
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        sequence,
                        "Incremental apply rejected; falling back to full resync"
                    );
                    store.set_connection_state(ConnectionState::Disconnected);
                    controller.reconnect_with_retry().await;
                }
            }
        }
        PushRoute::ConnectionStatus(ChannelStatus::Disconnected) => {
            tracing::warn!("Transport reported disconnect");
            store.set_connection_state(ConnectionState::Disconnected);
            controller.reconnect_with_retry().await;
        }
        PushRoute::ConnectionStatus(ChannelStatus::Connected) => {
            // Connected 只能由一次成功同步确立，这里仅记录
            tracing::debug!("Transport reported connected");
        }
        PushRoute::ResyncRequest(request) => {
            tracing::info!(
                since_sequence = request.since_sequence,
                "Server requested full resync"
            );
            if controller.resync().await.is_err() {
                controller.reconnect_with_retry().await;
            }
        }
        PushRoute::Unroutable { topic, error } => {
            tracing::warn!(%topic, %error, "Undecodable push payload; forcing full resync");
            store.set_connection_state(ConnectionState::Disconnected);
            controller.reconnect_with_retry().await;
        }
    }
}

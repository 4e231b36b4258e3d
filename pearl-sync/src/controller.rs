//! Sync controller
//!
//! Drives cold-start initialization, on-demand full resync, and the
//! reconnect-with-backoff loop. Every sync is a full sync (`since 0`):
//! after any disconnect the client cannot assume no events were missed,
//! and the server epoch may have advanced, so incremental catch-up is
//! never attempted.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rand::Rng;

use shared::sync::SyncResponse;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::store::{ConnectionState, OrderStore};
use crate::transport::SyncTransport;

/// Sync controller
///
/// Shareable handle (`Arc<SyncController<T>>`); the reconnect-attempt
/// counter and last-error value are interior state readable by the UI.
pub struct SyncController<T: SyncTransport> {
    transport: T,
    store: OrderStore,
    config: SyncConfig,
    attempt: AtomicU32,
    last_error: Mutex<Option<String>>,
}

impl<T: SyncTransport> SyncController<T> {
    /// Create a controller over a transport and an injected store handle
    pub fn new(transport: T, store: OrderStore, config: SyncConfig) -> Self {
        Self {
            transport,
            store,
            config,
            attempt: AtomicU32::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// The store this controller writes to
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Reconnect attempts since the last successful sync (UI display)
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempt.load(Ordering::Relaxed)
    }

    /// Last recorded sync failure, if any (UI display)
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Pure request/response call to the order service
    ///
    /// No local state mutation; transport errors surface to the caller.
    pub async fn sync_since(&self, since_sequence: u64) -> SyncResult<SyncResponse> {
        Ok(self.transport.sync_since(since_sequence).await?)
    }

    /// Cold-start initialization; call once at application start
    ///
    /// On failure the store is left `Disconnected` and the error is
    /// surfaced; this function never retries on its own.
    pub async fn initialize(&self) -> SyncResult<()> {
        if self.store.is_initialized() {
            tracing::warn!("initialize() called more than once");
        }

        tracing::info!("Initializing order sync");
        self.store.set_connection_state(ConnectionState::Syncing);

        match self.sync_since(0).await {
            Ok(response) => {
                self.store.full_sync(
                    response.active_orders,
                    response.server_sequence,
                    response.server_epoch,
                    response.events,
                );
                self.store.set_initialized(true);
                self.clear_error();
                tracing::info!(
                    server_sequence = self.store.server_sequence(),
                    server_epoch = self.store.server_epoch(),
                    "Order sync initialized"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Initial sync failed");
                self.store.set_connection_state(ConnectionState::Disconnected);
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Single reconnect attempt: one full sync, no delay
    ///
    /// Success resets the attempt counter; failure increments it and
    /// leaves the store `Disconnected`.
    pub async fn reconnect(&self) -> bool {
        self.store.set_connection_state(ConnectionState::Syncing);

        match self.sync_since(0).await {
            Ok(response) => {
                self.store.full_sync(
                    response.active_orders,
                    response.server_sequence,
                    response.server_epoch,
                    response.events,
                );
                self.attempt.store(0, Ordering::Relaxed);
                self.clear_error();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reconnect attempt failed");
                self.store.set_connection_state(ConnectionState::Disconnected);
                self.attempt.fetch_add(1, Ordering::Relaxed);
                self.record_error(&e);
                false
            }
        }
    }

    /// Reconnect with exponential backoff until success or exhaustion
    ///
    /// Returns false once the attempt limit is reached; after that an
    /// explicit external trigger (user action, app restart) is required
    /// to sync again.
    pub async fn reconnect_with_retry(&self) -> bool {
        let max_attempts = self.config.max_attempts;
        let mut attempts = 0u32;

        while attempts < max_attempts {
            if self.reconnect().await {
                tracing::info!(attempts, "Reconnected");
                return true;
            }
            attempts += 1;
            if attempts < max_attempts {
                let delay = self.jittered_delay(attempts);
                tracing::info!(
                    attempt = attempts,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnect failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(attempts = max_attempts, "Reconnect attempts exhausted");
        self.record_error(&SyncError::RetriesExhausted {
            attempts: max_attempts,
        });
        false
    }

    /// Unconditional single full resync (server-initiated resync
    /// requests, recovery after a rejected incremental apply)
    pub async fn resync(&self) -> SyncResult<()> {
        self.store.set_connection_state(ConnectionState::Syncing);

        match self.sync_since(0).await {
            Ok(response) => {
                self.store.full_sync(
                    response.active_orders,
                    response.server_sequence,
                    response.server_epoch,
                    response.events,
                );
                self.attempt.store(0, Ordering::Relaxed);
                self.clear_error();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Full resync failed");
                self.store.set_connection_state(ConnectionState::Disconnected);
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Delay before retry number `attempt` (1-based), jitter applied
    fn jittered_delay(&self, attempt: u32) -> Duration {
        let base = retry_delay(attempt, &self.config);
        if self.config.jitter <= 0.0 {
            return base;
        }
        let factor = 1.0 + self.config.jitter * rand::thread_rng().gen_range(-1.0..=1.0);
        base.mul_f64(factor.max(0.0))
    }

    fn record_error(&self, error: &SyncError) {
        *self.last_error.lock().unwrap() = Some(error.to_string());
    }

    fn clear_error(&self) {
        *self.last_error.lock().unwrap() = None;
    }
}

/// Unjittered delay before retry number `attempt` (1-based):
/// `min(base * multiplier^(attempt - 1), max_delay)`
fn retry_delay(attempt: u32, config: &SyncConfig) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let scaled = config.base_delay.as_millis() as f64 * config.multiplier.powi(exponent as i32);
    let capped = scaled.min(config.max_delay.as_millis() as f64);
    Duration::from_millis(capped as u64)
}

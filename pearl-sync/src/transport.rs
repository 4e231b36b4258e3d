//! Transport seam for the sync protocol
//!
//! The concrete transport (in-process channels in server mode, mTLS TCP
//! in client mode) lives outside this crate; the controller only needs
//! the synchronous sync call. Push messages arrive separately on a
//! broadcast channel consumed by the listener.

use async_trait::async_trait;
use shared::sync::SyncResponse;

use crate::error::TransportError;

/// Request/response side of the order service connection
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Fetch authoritative state since `since_sequence`
    ///
    /// This client always passes 0 (full sync); the parameter exists
    /// for forward compatibility.
    async fn sync_since(&self, since_sequence: u64) -> Result<SyncResponse, TransportError>;
}

//! Sync client error types

use thiserror::Error;

/// Transport-level failure surfaced by the sync seam
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or was lost mid-request
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response arrived but could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sync controller error type
///
/// Expected failures (network, validation) never escape the controller
/// as panics; they become connection-state transitions plus a recorded
/// last-error value.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network-level failure; recovered via the backoff loop
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed or inconsistent server data; never patched in place
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Backoff loop gave up; an external trigger is required to resume
    #[error("Reconnect failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Sync operation issued before initialize()
    #[error("Sync client not initialized")]
    NotInitialized,
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Incremental apply rejection
///
/// A rejected apply mutates nothing; the caller must fall back to a
/// full sync rather than patch around the inconsistency.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// Event sequence is not exactly last known + 1
    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    /// Event belongs to a different server log generation
    #[error("Epoch mismatch: expected {expected}, got {got}")]
    EpochMismatch { expected: u64, got: u64 },

    /// Incremental apply before the first full sync
    /// Indicates the single-writer startup order was violated
    #[error("Store not initialized")]
    NotInitialized,
}

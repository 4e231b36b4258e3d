//! Order events - immutable facts recorded after command processing

use super::types::{LineItem, PaymentRecord};
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number, unique within an epoch
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Server log generation; bumped whenever the event log is reset
    /// or made non-contiguous
    pub epoch: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - always set by server
    pub timestamp: i64,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Event kind
    pub event_type: OrderEventKind,
    /// Event payload
    pub payload: EventPayload,
}

/// Event kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    // Lifecycle
    Opened,
    Completed,
    Voided,

    // Items
    ItemsAdded,
    ItemRemoved,

    // Payments
    PaymentAdded,

    // Split
    Split,

    // Table operations
    Moved,
    Merged,

    // Other
    InfoUpdated,
}

impl std::fmt::Display for OrderEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventKind::Opened => write!(f, "OPENED"),
            OrderEventKind::Completed => write!(f, "COMPLETED"),
            OrderEventKind::Voided => write!(f, "VOIDED"),
            OrderEventKind::ItemsAdded => write!(f, "ITEMS_ADDED"),
            OrderEventKind::ItemRemoved => write!(f, "ITEM_REMOVED"),
            OrderEventKind::PaymentAdded => write!(f, "PAYMENT_ADDED"),
            OrderEventKind::Split => write!(f, "SPLIT"),
            OrderEventKind::Moved => write!(f, "MOVED"),
            OrderEventKind::Merged => write!(f, "MERGED"),
            OrderEventKind::InfoUpdated => write!(f, "INFO_UPDATED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    Opened {
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_name: Option<String>,
        guest_count: i32,
        is_retail: bool,
        /// Server-generated receipt number (always present)
        receipt_number: String,
    },

    Completed {
        receipt_number: String,
        final_total: f64,
        payments: Vec<PaymentRecord>,
    },

    Voided {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        authorizer_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        authorizer_name: Option<String>,
    },

    // ========== Items ==========
    ItemsAdded {
        /// Complete snapshots of added items
        items: Vec<LineItem>,
    },

    ItemRemoved {
        instance_id: String,
        item_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Payments ==========
    PaymentAdded {
        payment_id: String,
        method: String,
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        tendered: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        change: Option<f64>,
    },

    // ========== Split ==========
    Split {
        split_amount: f64,
        payment_method: String,
        items: Vec<LineItem>,
    },

    // ========== Table Operations ==========
    Moved {
        source_table_id: String,
        source_table_name: String,
        target_table_id: String,
        target_table_name: String,
    },

    Merged {
        source_order_id: String,
        source_table_name: String,
        items: Vec<LineItem>,
    },

    // ========== Other ==========
    /// Order info updated (receipt number is immutable - set at open)
    InfoUpdated {
        #[serde(skip_serializing_if = "Option::is_none")]
        guest_count: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_name: Option<String>,
    },
}

impl OrderEvent {
    /// Create a new event
    ///
    /// # Arguments
    /// * `sequence` - Global sequence number (authoritative ordering)
    /// * `epoch` - Server log generation the sequence belongs to
    /// * `order_id` - Order this event belongs to
    /// * `operator_id` - Operator who triggered this event
    /// * `operator_name` - Operator name (snapshot for audit)
    /// * `event_type` - Event kind
    /// * `payload` - Event payload
    pub fn new(
        sequence: u64,
        epoch: u64,
        order_id: String,
        operator_id: String,
        operator_name: String,
        event_type: OrderEventKind,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            epoch,
            order_id,
            // Server timestamp is ALWAYS set by server
            timestamp: chrono::Utc::now().timestamp_millis(),
            operator_id,
            operator_name,
            event_type,
            payload,
        }
    }
}

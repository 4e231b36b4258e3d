//! Item and payment types embedded in order snapshots

use serde::{Deserialize, Serialize};

/// Line item snapshot - complete server-computed line state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product ID
    pub product_id: String,
    /// Instance ID (unique per line within an order)
    pub instance_id: String,
    /// Product name (snapshot for display and audit)
    pub name: String,
    /// Unit price after discounts
    pub price: f64,
    /// Quantity
    pub quantity: i32,
    /// Line total (computed by server: price * quantity)
    pub line_total: f64,
    /// Selected option names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Item note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payment record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    /// Payment unique ID
    pub payment_id: String,
    /// Payment method (e.g. "cash", "card")
    pub method: String,
    /// Amount applied to the order
    pub amount: f64,
    /// Amount tendered (cash payments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<f64>,
    /// Change returned (cash payments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Payment timestamp (Unix milliseconds, server clock)
    pub paid_at: i64,
}

//! Order snapshot - fully-computed order state
//!
//! Snapshots are produced by the order service on every state-changing
//! operation and replace prior state wholesale. The client treats them
//! as opaque computed data and never recomputes totals locally.

use super::types::{LineItem, PaymentRecord};
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Active,
    Completed,
    Void,
    Moved,
    Merged,
}

/// Order snapshot - server-computed, replaces rather than patches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Table ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Table name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Zone name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    /// Guest count
    pub guest_count: i32,
    /// Whether this is a retail (counter) order
    #[serde(default)]
    pub is_retail: bool,
    /// Order status
    pub status: OrderStatus,
    /// Items in the order
    pub items: Vec<LineItem>,
    /// Payment records
    pub payments: Vec<PaymentRecord>,
    /// Subtotal before tax and adjustments
    pub subtotal: f64,
    /// Tax amount
    #[serde(default)]
    pub tax: f64,
    /// Discount amount
    #[serde(default)]
    pub discount: f64,
    /// Total amount
    pub total: f64,
    /// Amount paid
    #[serde(default)]
    pub paid_amount: f64,
    /// Receipt number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    /// Order start time (Unix milliseconds)
    pub start_time: i64,
    /// Order end time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Last update timestamp
    pub updated_at: i64,
    /// Last applied event sequence
    pub last_sequence: u64,
}

impl OrderSnapshot {
    /// Create a new empty order
    pub fn new(order_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            order_id,
            table_id: None,
            table_name: None,
            zone_name: None,
            guest_count: 1,
            is_retail: false,
            status: OrderStatus::Active,
            items: Vec::new(),
            payments: Vec::new(),
            subtotal: 0.0,
            tax: 0.0,
            discount: 0.0,
            total: 0.0,
            paid_amount: 0.0,
            receipt_number: None,
            start_time: now,
            end_time: None,
            updated_at: now,
            last_sequence: 0,
        }
    }

    /// Check if order is still active
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Check if order has reached a terminal status
    ///
    /// A terminal snapshot removes the order from the active table.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Calculate remaining amount to pay
    pub fn remaining_amount(&self) -> f64 {
        (self.total - self.paid_amount).max(0.0)
    }

    /// Check if fully paid
    pub fn is_fully_paid(&self) -> bool {
        self.paid_amount >= self.total
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_active() {
        let order = OrderSnapshot::new("o-1".to_string());
        assert!(order.is_active());
        assert!(!order.is_terminal());
        assert_eq!(order.last_sequence, 0);
    }

    #[test]
    fn test_terminal_statuses() {
        for status in [
            OrderStatus::Completed,
            OrderStatus::Void,
            OrderStatus::Moved,
            OrderStatus::Merged,
        ] {
            let mut order = OrderSnapshot::new("o-1".to_string());
            order.status = status;
            assert!(order.is_terminal());
        }
    }

    #[test]
    fn test_remaining_amount() {
        let mut order = OrderSnapshot::new("o-1".to_string());
        order.total = 25.0;
        order.paid_amount = 10.0;
        assert_eq!(order.remaining_amount(), 15.0);
        assert!(!order.is_fully_paid());

        // Overpayment never reports a negative remainder
        order.paid_amount = 30.0;
        assert_eq!(order.remaining_amount(), 0.0);
        assert!(order.is_fully_paid());
    }
}

//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Transitions:
/// ```text
/// pending ──► confirmed ──► processing ──► shipped ──► delivered
///    │             │             │             │
///    └─────────────┴─────────────┴─────────────┴──► cancelled
/// ```
///
/// `pending → processing` is additionally reachable directly via buyer
/// payment submission, bypassing seller confirmation (and therefore the
/// confirm-time stock decrement). `delivered` is reachable from every
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed by the buyer, awaiting seller confirmation.
    #[default]
    Pending,

    /// Confirmed by a seller; that seller's stock has been deducted.
    Confirmed,

    /// Being prepared, or paid for by the buyer.
    Processing,

    /// Handed to the carrier.
    Shipped,

    /// Delivered to the buyer (terminal).
    Delivered,

    /// Cancelled before delivery (terminal, no stock restoration).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the edge `self → to` exists in the transition table.
    ///
    /// Same-status "transitions" are not edges; callers treat them as
    /// idempotent no-ops before consulting the table.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, to) {
            (Pending, Confirmed | Processing | Cancelled | Delivered) => true,
            (Confirmed, Processing | Shipped | Cancelled | Delivered) => true,
            (Processing, Shipped | Cancelled | Delivered) => true,
            (Shipped, Delivered | Cancelled) => true,
            _ => false,
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its lowercase wire form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

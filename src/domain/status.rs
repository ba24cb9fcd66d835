use crate::error::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// Orders move monotonically along `Pending -> Processing -> {Completed | Failed}`.
/// `Completed` and `Failed` are terminal. A payment failure may also take an
/// order straight from `Pending` to `Failed`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl OrderStatus {
    /// All statuses in declaration order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Failed,
    ];

    /// Value used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Failed => "Failed",
        }
    }

    /// Presentation hint for display contexts.
    pub fn css_class(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "warning",
            OrderStatus::Processing => "info",
            OrderStatus::Completed => "success",
            OrderStatus::Failed => "danger",
        }
    }

    pub fn is_pending(&self) -> bool {
        *self == OrderStatus::Pending
    }

    pub fn is_processing(&self) -> bool {
        *self == OrderStatus::Processing
    }

    pub fn is_completed(&self) -> bool {
        *self == OrderStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        *self == OrderStatus::Failed
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }

    /// Whether `next` is reachable from `self` in a single step.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Failed)
                | (OrderStatus::Processing, OrderStatus::Completed)
                | (OrderStatus::Processing, OrderStatus::Failed)
        )
    }

    /// Maps every status to its label, in declaration order.
    pub fn to_array() -> [(OrderStatus, &'static str); 4] {
        Self::ALL.map(|status| (status, status.label()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::ValidationError(format!("unknown order status '{s}'")))
    }
}

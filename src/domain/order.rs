use super::status::OrderStatus;
use super::user::UserId;
use crate::error::{OrderError, Result};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A positive monetary amount with exactly 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const SCALE: u32 = 2;
    /// Bounds of generated amounts, in cents.
    const RANDOM_MIN_CENTS: i64 = 100;
    const RANDOM_MAX_CENTS: i64 = 10_000;

    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(OrderError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        if value.normalize().scale() > Self::SCALE {
            return Err(OrderError::ValidationError(format!(
                "Amount {value} has more than {} decimal places",
                Self::SCALE
            )));
        }
        let mut value = value;
        value.rescale(Self::SCALE);
        Ok(Self(value))
    }

    /// Draws an amount uniformly over the cents in [1.00, 100.00].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let cents = rng.gen_range(Self::RANDOM_MIN_CENTS..=Self::RANDOM_MAX_CENTS);
        Self(Decimal::new(cents, Self::SCALE))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = OrderError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything needed to persist a new order; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub amount: Amount,
    pub status: OrderStatus,
}

impl OrderDraft {
    pub fn pending(user_id: UserId, amount: Amount) -> Self {
        Self {
            user_id,
            amount,
            status: OrderStatus::Pending,
        }
    }

    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            user_id: self.user_id,
            amount: self.amount,
            status: self.status,
        }
    }
}

/// A purchase request and its payment lifecycle.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub amount: Amount,
    pub status: OrderStatus,
}

impl Order {
    /// Moves the order to `next`, rejecting anything but a single forward step.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Marks the order as being processed. An order left in `Processing` by an
    /// interrupted attempt may be marked again.
    pub fn mark_processing(&mut self) -> Result<()> {
        if self.status.is_processing() {
            return Ok(());
        }
        self.transition_to(OrderStatus::Processing)
    }

    /// Forces the order into `Failed`.
    ///
    /// Returns `Ok(false)` when the order was already failed and nothing changed.
    /// A completed order is never downgraded.
    pub fn fail(&mut self) -> Result<bool> {
        match self.status {
            OrderStatus::Failed => Ok(false),
            OrderStatus::Completed => Err(OrderError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Failed,
            }),
            _ => {
                self.status = OrderStatus::Failed;
                Ok(true)
            }
        }
    }
}

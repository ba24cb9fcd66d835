use super::job::{Job, RetryPolicy};
use super::payment_service::PaymentService;
use crate::domain::order::OrderId;
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queued unit of work that settles the payment of one order.
///
/// The payload carries only the order id; every attempt reloads the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentJob {
    pub order_id: OrderId,
}

impl PaymentJob {
    /// Number of times the job may be attempted.
    pub const TRIES: u32 = 3;
    /// Maximum number of seconds a single attempt may run.
    pub const TIMEOUT_SECS: u64 = 30;

    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }

    pub fn tries(&self) -> u32 {
        Self::TRIES
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(Self::TIMEOUT_SECS)
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.tries(), self.timeout())
    }
}

#[async_trait]
impl Job for PaymentJob {
    type Context = PaymentService;

    fn key(&self) -> u64 {
        self.order_id.0
    }

    async fn handle(&self, payments: &PaymentService) -> Result<()> {
        let mut order = payments
            .orders()
            .get(self.order_id)
            .await?
            .ok_or(OrderError::NotFound(self.order_id))?;

        if order.status.is_terminal() {
            tracing::info!(
                order_id = %order.id,
                status = %order.status,
                "Order already settled, skipping payment"
            );
            return Ok(());
        }

        payments.process_payment(&mut order).await;

        // A storage outage can leave the order unsettled; fail the attempt so
        // it is retried and, eventually, handed to `failed`.
        let persisted = payments
            .orders()
            .get(self.order_id)
            .await?
            .ok_or(OrderError::NotFound(self.order_id))?;
        if !persisted.status.is_terminal() {
            return Err(OrderError::Unsettled {
                id: self.order_id,
                status: persisted.status,
            });
        }
        Ok(())
    }

    /// Forces the order to `Failed` unless it already is. A `Completed` order
    /// is intentionally kept as is so terminal statuses never change.
    async fn failed(&self, payments: &PaymentService, error: &OrderError) {
        tracing::error!(order_id = %self.order_id, error = %error, "Payment job failed");

        let mut order = match payments.orders().get(self.order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return,
            Err(lookup) => {
                tracing::error!(
                    order_id = %self.order_id,
                    error = %lookup,
                    "Could not load order after job failure"
                );
                return;
            }
        };

        match order.fail() {
            Ok(true) => {
                if let Err(save) = payments.orders().save(&order).await {
                    tracing::error!(
                        order_id = %self.order_id,
                        error = %save,
                        "Could not persist failed status"
                    );
                }
            }
            Ok(false) => {}
            Err(_) => {
                tracing::warn!(
                    order_id = %self.order_id,
                    "Order completed before job failure, keeping completed status"
                );
            }
        }
    }
}

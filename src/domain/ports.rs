use super::order::{Order, OrderDraft, OrderId};
use super::user::{User, UserId};
use crate::application::job::RetryPolicy;
use crate::application::payment_job::PaymentJob;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Persistent storage for orders.
///
/// Implementations must offer read-your-writes consistency within a process.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, draft: OrderDraft) -> Result<Order>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    async fn save(&self, order: &Order) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, name: &str) -> Result<User>;
    async fn get(&self, id: UserId) -> Result<Option<User>>;
}

/// Submission side of the asynchronous job queue.
///
/// The queue runs a job at most once concurrently per order id, at most
/// `policy.max_attempts` times, and calls the failure callback once when the
/// budget is exhausted.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: PaymentJob, policy: RetryPolicy) -> Result<()>;
}

/// Decides the outcome of a payment attempt.
pub trait PaymentDecider: Send + Sync {
    fn decide(&self) -> bool;
}

pub type OrderStoreHandle = Arc<dyn OrderStore>;
pub type UserStoreHandle = Arc<dyn UserStore>;
pub type JobQueueHandle = Arc<dyn JobQueue>;
pub type PaymentDeciderHandle = Arc<dyn PaymentDecider>;

use super::payment_job::PaymentJob;
use crate::domain::order::{Amount, Order, OrderDraft, OrderId};
use crate::domain::ports::{JobQueueHandle, OrderStoreHandle, UserStoreHandle};
use crate::domain::user::UserId;
use crate::error::{OrderError, Result};

/// Entry point for order creation and lookup.
///
/// Creating an order only persists it and enqueues its payment job; the
/// payment is settled asynchronously by whoever consumes the queue.
pub struct OrderService {
    orders: OrderStoreHandle,
    users: UserStoreHandle,
    queue: JobQueueHandle,
}

impl OrderService {
    pub fn new(orders: OrderStoreHandle, users: UserStoreHandle, queue: JobQueueHandle) -> Self {
        Self {
            orders,
            users,
            queue,
        }
    }

    /// Creates a pending order owned by `owner` with a generated amount and
    /// enqueues exactly one payment job for it.
    pub async fn create_order(&self, owner: UserId) -> Result<Order> {
        if self.users.get(owner).await?.is_none() {
            return Err(OrderError::UserNotFound(owner));
        }

        let amount = Amount::random(&mut rand::thread_rng());
        let order = self.orders.create(OrderDraft::pending(owner, amount)).await?;

        let job = PaymentJob::new(order.id);
        self.queue.enqueue(job, job.policy()).await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %owner,
            amount = %order.amount,
            "Order created"
        );
        Ok(order)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.orders.get(id).await?.ok_or(OrderError::NotFound(id))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.orders.get_all().await
    }
}

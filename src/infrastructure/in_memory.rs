use crate::application::job::RetryPolicy;
use crate::application::payment_job::PaymentJob;
use crate::domain::order::{Order, OrderDraft, OrderId};
use crate::domain::ports::{JobQueue, OrderStore, UserStore};
use crate::domain::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A thread-safe in-memory store for orders.
///
/// Ids are allocated sequentially from 1 under the same write lock that
/// inserts the order.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let next = orders.keys().next_back().map_or(1, |id| id.0 + 1);
        let order = draft.into_order(OrderId(next));
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn save(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for users.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<BTreeMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, name: &str) -> Result<User> {
        let mut users = self.users.write().await;
        let next = users.keys().next_back().map_or(1, |id| id.0 + 1);
        let user = User {
            id: UserId(next),
            name: name.to_string(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

/// A job queue that only records submissions.
///
/// Nothing is executed; callers inspect `submitted` and run jobs themselves.
#[derive(Default)]
pub struct InMemoryJobQueue {
    submitted: Mutex<Vec<(PaymentJob, RetryPolicy)>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submitted(&self) -> Vec<(PaymentJob, RetryPolicy)> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: PaymentJob, policy: RetryPolicy) -> Result<()> {
        self.submitted.lock().await.push((job, policy));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Amount;
    use crate::domain::status::OrderStatus;
    use rust_decimal_macros::dec;

    fn draft() -> OrderDraft {
        OrderDraft::pending(UserId(1), Amount::new(dec!(25.50)).unwrap())
    }

    #[tokio::test]
    async fn test_in_memory_order_store() {
        let store = InMemoryOrderStore::new();
        let mut order = store.create(draft()).await.unwrap();
        assert_eq!(order.id, OrderId(1));

        order.status = OrderStatus::Processing;
        store.save(&order).await.unwrap();
        let retrieved = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(retrieved, order);

        assert!(store.get(OrderId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_order_store_assigns_sequential_ids() {
        let store = InMemoryOrderStore::new();
        for expected in 1..=3 {
            assert_eq!(store.create(draft()).await.unwrap().id, OrderId(expected));
        }
        assert_eq!(store.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_in_memory_user_store() {
        let store = InMemoryUserStore::new();
        let user = store.create("alice").await.unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(store.get(user.id).await.unwrap(), Some(user));
        assert!(store.get(UserId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_job_queue_records_submissions() {
        let queue = InMemoryJobQueue::new();
        let job = PaymentJob::new(OrderId(5));
        queue.enqueue(job, job.policy()).await.unwrap();

        assert_eq!(queue.submitted().await, vec![(job, job.policy())]);
    }
}

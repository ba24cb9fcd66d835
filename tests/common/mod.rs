#![allow(dead_code)]

use async_trait::async_trait;
use orderflow::domain::order::{Amount, Order, OrderDraft, OrderId};
use orderflow::domain::ports::OrderStore;
use orderflow::domain::status::OrderStatus;
use orderflow::domain::user::UserId;
use orderflow::error::{OrderError, Result};
use orderflow::infrastructure::in_memory::InMemoryOrderStore;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps the in-memory store, counting writes and injecting failures.
#[derive(Default)]
pub struct InstrumentedOrderStore {
    inner: InMemoryOrderStore,
    save_calls: AtomicUsize,
    /// 1-based indexes of the `save` calls that fail.
    failing_saves: Vec<usize>,
    fail_reads: bool,
}

impl InstrumentedOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_saves(calls: &[usize]) -> Self {
        Self {
            failing_saves: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Persists an order bypassing the counters.
    pub async fn seed(&self, amount: &str, status: OrderStatus) -> Order {
        let amount = Amount::new(amount.parse().unwrap()).unwrap();
        let mut order = self
            .inner
            .create(OrderDraft::pending(UserId(1), amount))
            .await
            .unwrap();
        order.status = status;
        self.inner.save(&order).await.unwrap();
        order
    }

    pub async fn status_of(&self, id: OrderId) -> OrderStatus {
        self.inner.get(id).await.unwrap().unwrap().status
    }
}

fn injected(what: &str) -> OrderError {
    OrderError::InternalError(Box::new(std::io::Error::other(format!(
        "injected {what} failure"
    ))))
}

#[async_trait]
impl OrderStore for InstrumentedOrderStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        self.inner.create(draft).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        if self.fail_reads {
            return Err(injected("read"));
        }
        self.inner.get(id).await
    }

    async fn save(&self, order: &Order) -> Result<()> {
        let call = self.save_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_saves.contains(&call) {
            return Err(injected("write"));
        }
        self.inner.save(order).await
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.inner.get_all().await
    }
}

pub fn hundred() -> Amount {
    Amount::new(dec!(100.00)).unwrap()
}

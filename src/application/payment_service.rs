use crate::domain::order::Order;
use crate::domain::ports::{OrderStoreHandle, PaymentDeciderHandle};
use crate::domain::status::OrderStatus;
use crate::error::Result;

/// Runs payment attempts and owns every status change they cause.
///
/// The outcome itself comes from an injected `PaymentDecider`, so the service
/// behaves the same against a simulated or a fixed decision.
pub struct PaymentService {
    orders: OrderStoreHandle,
    decider: PaymentDeciderHandle,
}

impl PaymentService {
    pub fn new(orders: OrderStoreHandle, decider: PaymentDeciderHandle) -> Self {
        Self { orders, decider }
    }

    pub fn orders(&self) -> &OrderStoreHandle {
        &self.orders
    }

    /// Processes the payment for `order` and returns whether it succeeded.
    ///
    /// The order is persisted as `Processing` before the outcome is known, then
    /// persisted again as `Completed` or `Failed`. Any error along the way is
    /// logged and turns the order `Failed`; nothing is propagated.
    ///
    /// An order that is already settled is left untouched and reported as it is.
    pub async fn process_payment(&self, order: &mut Order) -> bool {
        if order.status.is_terminal() {
            return order.status.is_completed();
        }
        match self.try_process(order).await {
            Ok(success) => success,
            Err(error) => {
                tracing::error!(
                    order_id = %order.id,
                    amount = %order.amount,
                    status = %order.status,
                    error = %error,
                    "Payment processing failed"
                );
                self.force_failed(order).await;
                false
            }
        }
    }

    async fn try_process(&self, order: &mut Order) -> Result<bool> {
        let mut processing = order.clone();
        processing.mark_processing()?;
        self.orders.save(&processing).await?;
        *order = processing;

        let success = self.decider.decide();
        let outcome = if success {
            OrderStatus::Completed
        } else {
            OrderStatus::Failed
        };
        // `order` only takes the new status once it is persisted.
        let mut settled = order.clone();
        settled.transition_to(outcome)?;
        self.orders.save(&settled).await?;
        *order = settled;

        if success {
            tracing::info!(order_id = %order.id, amount = %order.amount, "Payment processed successfully");
        } else {
            tracing::info!(order_id = %order.id, amount = %order.amount, "Payment failed");
        }
        Ok(success)
    }

    async fn force_failed(&self, order: &mut Order) {
        match order.fail() {
            Ok(_) => {
                if let Err(error) = self.orders.save(order).await {
                    tracing::error!(
                        order_id = %order.id,
                        error = %error,
                        "Could not persist failed status"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(order_id = %order.id, error = %error, "Order left unchanged");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, OrderDraft};
    use crate::domain::ports::OrderStore;
    use crate::domain::user::UserId;
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use crate::infrastructure::simulated::FixedDecider;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn setup(outcome: bool) -> (PaymentService, Arc<InMemoryOrderStore>, Order) {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = store
            .create(OrderDraft::pending(
                UserId(1),
                Amount::new(dec!(100.00)).unwrap(),
            ))
            .await
            .unwrap();
        let service = PaymentService::new(store.clone(), Arc::new(FixedDecider(outcome)));
        (service, store, order)
    }

    #[tokio::test]
    async fn test_successful_payment_completes_order() {
        let (service, store, mut order) = setup(true).await;

        assert!(service.process_payment(&mut order).await);
        assert_eq!(order.status, OrderStatus::Completed);

        let stored = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_declined_payment_fails_order() {
        let (service, store, mut order) = setup(false).await;

        assert!(!service.process_payment(&mut order).await);

        let stored = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn test_settled_order_is_not_reprocessed() {
        for settled in [OrderStatus::Completed, OrderStatus::Failed] {
            let (service, store, mut order) = setup(settled.is_failed()).await;
            order.status = settled;
            store.save(&order).await.unwrap();

            let success = service.process_payment(&mut order).await;

            assert_eq!(success, settled.is_completed());
            let stored = store.get(order.id).await.unwrap().unwrap();
            assert_eq!(stored.status, settled);
        }
    }
}

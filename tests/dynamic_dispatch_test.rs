use orderflow::domain::order::{Amount, OrderDraft, OrderId};
use orderflow::domain::ports::{OrderStoreHandle, UserStoreHandle};
use orderflow::domain::user::UserId;
use orderflow::infrastructure::in_memory::{InMemoryOrderStore, InMemoryUserStore};
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let order_store: OrderStoreHandle = Arc::new(InMemoryOrderStore::new());
    let user_store: UserStoreHandle = Arc::new(InMemoryUserStore::new());

    let draft = OrderDraft::pending(UserId(1), Amount::new(dec!(9.99)).unwrap());

    // Verify Send + Sync by spawning tasks
    let orders = order_store.clone();
    let order_handle = tokio::spawn(async move {
        let order = orders.create(draft).await.unwrap();
        orders.get(order.id).await.unwrap().unwrap()
    });

    let users = user_store.clone();
    let user_handle = tokio::spawn(async move {
        let user = users.create("alice").await.unwrap();
        users.get(user.id).await.unwrap().unwrap()
    });

    let retrieved_order = order_handle.await.unwrap();
    assert_eq!(retrieved_order.id, OrderId(1));

    let retrieved_user = user_handle.await.unwrap();
    assert_eq!(retrieved_user.name, "alice");

    // Both handles observe the writes made from the spawned tasks.
    assert!(order_store.get(OrderId(1)).await.unwrap().is_some());
    assert!(user_store.get(UserId(1)).await.unwrap().is_some());
}

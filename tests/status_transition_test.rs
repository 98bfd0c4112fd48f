//! Lifecycle transitions of persisted orders and their stock effects.

use std::sync::Arc;

use bigdecimal::BigDecimal;

use bloomstock::adapters::MemoryStore;
use bloomstock::domain::{NewCustomer, NewFlower, Order, OrderStatus};
use bloomstock::error::ShopError;
use bloomstock::ports::ShopStore;
use bloomstock::services::FlowerShop;
use bloomstock::use_cases::AddItemRequest;

struct Fixture {
    store: Arc<MemoryStore>,
    shop: FlowerShop,
    customer_id: i64,
    rose_id: i64,
    tulip_id: i64,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let shop = FlowerShop::new(store.clone());

    let rose = shop
        .add_flower(NewFlower {
            name: "Red Rose".to_string(),
            price: BigDecimal::from(3),
            quantity: 10,
            category: "Roses".to_string(),
            low_stock_threshold: 2,
        })
        .await
        .unwrap();
    let tulip = shop
        .add_flower(NewFlower {
            name: "Yellow Tulip".to_string(),
            price: BigDecimal::from(2),
            quantity: 3,
            category: "Tulips".to_string(),
            low_stock_threshold: 2,
        })
        .await
        .unwrap();
    let customer = shop
        .add_customer(NewCustomer {
            name: "Ada Bloom".to_string(),
            phone: "555-0101".to_string(),
            email: "ada@example.com".to_string(),
        })
        .await
        .unwrap();

    Fixture {
        store,
        shop,
        customer_id: customer.id,
        rose_id: rose.id,
        tulip_id: tulip.id,
    }
}

async fn stock(store: &MemoryStore, flower_id: i64) -> i64 {
    store.get_flower(flower_id).await.unwrap().unwrap().quantity
}

/// Commit an order for `items` as `status` and return it.
async fn place_order(fx: &Fixture, items: &[(i64, i64)], status: OrderStatus) -> Order {
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();
    for &(flower_id, quantity) in items {
        builder
            .add_item(AddItemRequest {
                flower_id,
                quantity,
            })
            .await
            .unwrap();
    }
    builder.finish(status).await.unwrap()
}

#[tokio::test]
async fn completing_a_pending_order_debits_stock_exactly_once() {
    let fx = fixture().await;
    let order = place_order(&fx, &[(fx.rose_id, 4)], OrderStatus::Pending).await;
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);

    let order = fx
        .shop
        .change_order_status(order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 6);

    // Asking for completed again is a no-op, not a second debit.
    let order = fx
        .shop
        .change_order_status(order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 6);
}

#[tokio::test]
async fn cancelling_a_completed_order_restores_stock() {
    let fx = fixture().await;
    let order = place_order(&fx, &[(fx.rose_id, 4)], OrderStatus::Completed).await;
    assert_eq!(stock(&fx.store, fx.rose_id).await, 6);

    let order = fx
        .shop
        .change_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
}

#[tokio::test]
async fn cancelling_a_pending_order_leaves_stock_alone() {
    let fx = fixture().await;
    let order = place_order(&fx, &[(fx.rose_id, 4)], OrderStatus::Pending).await;

    let order = fx
        .shop
        .change_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
}

#[tokio::test]
async fn cancelled_order_cannot_be_completed_again() {
    let fx = fixture().await;
    let order = place_order(&fx, &[(fx.rose_id, 4)], OrderStatus::Completed).await;
    fx.shop
        .change_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);

    let err = fx
        .shop
        .change_order_status(order.id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Completed
        }
    ));
    // Neither status nor stock moved.
    let order = fx.shop.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
}

#[tokio::test]
async fn nothing_returns_to_pending() {
    let fx = fixture().await;
    let order = place_order(&fx, &[(fx.rose_id, 4)], OrderStatus::Completed).await;

    let err = fx
        .shop
        .change_order_status(order.id, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::InvalidTransition { .. }));
    assert_eq!(stock(&fx.store, fx.rose_id).await, 6);
}

#[tokio::test]
async fn failed_transition_rolls_back_every_item() {
    let fx = fixture().await;

    // A pending order wanting 4 roses and all 3 tulips.
    let pending = place_order(&fx, &[(fx.rose_id, 4), (fx.tulip_id, 3)], OrderStatus::Pending).await;

    // A second order takes 2 tulips first, leaving only 1.
    place_order(&fx, &[(fx.tulip_id, 2)], OrderStatus::Completed).await;
    assert_eq!(stock(&fx.store, fx.tulip_id).await, 1);

    let err = fx
        .shop
        .change_order_status(pending.id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::InsufficientStock {
            requested: 3,
            available: 1,
            ..
        }
    ));

    // The rose debit from earlier in the batch must not have leaked.
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
    assert_eq!(stock(&fx.store, fx.tulip_id).await, 1);
    let order = fx.shop.get_order(pending.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let fx = fixture().await;
    let err = fx
        .shop
        .change_order_status(777, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::NotFound {
            entity: "order",
            id: 777
        }
    ));
}

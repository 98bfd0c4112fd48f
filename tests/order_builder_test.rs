//! Order assembly workflow: totals, add-time stock checks, and the
//! all-or-nothing commit.

use std::sync::Arc;

use bigdecimal::BigDecimal;

use bloomstock::adapters::MemoryStore;
use bloomstock::domain::{NewCustomer, NewFlower, OrderStatus};
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

fn price(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let shop = FlowerShop::new(store.clone());

    let rose = shop
        .add_flower(NewFlower {
            name: "Red Rose".to_string(),
            price: price("2.50"),
            quantity: 10,
            category: "Roses".to_string(),
            low_stock_threshold: 5,
        })
        .await
        .unwrap();
    let tulip = shop
        .add_flower(NewFlower {
            name: "Yellow Tulip".to_string(),
            price: price("1.75"),
            quantity: 3,
            category: "Tulips".to_string(),
            low_stock_threshold: 5,
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

#[tokio::test]
async fn total_tracks_items_after_every_add() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();

    builder
        .add_item(AddItemRequest {
            flower_id: fx.rose_id,
            quantity: 4,
        })
        .await
        .unwrap();
    assert_eq!(*builder.total(), price("10.00"));

    builder
        .add_item(AddItemRequest {
            flower_id: fx.tulip_id,
            quantity: 2,
        })
        .await
        .unwrap();
    assert_eq!(*builder.total(), price("13.50"));

    builder
        .add_item(AddItemRequest {
            flower_id: fx.rose_id,
            quantity: 1,
        })
        .await
        .unwrap();
    assert_eq!(*builder.total(), price("16.00"));
    assert_eq!(builder.items().len(), 3);
}

#[tokio::test]
async fn add_item_rejects_overdraw_and_leaves_everything_unchanged() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();

    // Tulips only have 3 on hand.
    let err = builder
        .add_item(AddItemRequest {
            flower_id: fx.tulip_id,
            quantity: 5,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::InsufficientStock {
            requested: 5,
            available: 3,
            ..
        }
    ));

    assert!(builder.items().is_empty());
    assert_eq!(*builder.total(), BigDecimal::from(0));
    assert_eq!(stock(&fx.store, fx.tulip_id).await, 3);
}

#[tokio::test]
async fn add_item_unknown_flower_is_not_found() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();

    let err = builder
        .add_item(AddItemRequest {
            flower_id: 999,
            quantity: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::NotFound {
            entity: "flower",
            id: 999
        }
    ));
}

#[tokio::test]
async fn create_order_unknown_customer_is_not_found() {
    let fx = fixture().await;
    let err = fx.shop.create_order(404).await.unwrap_err();
    assert!(matches!(
        err,
        ShopError::NotFound {
            entity: "customer",
            id: 404
        }
    ));
}

#[tokio::test]
async fn finishing_with_no_items_persists_nothing() {
    let fx = fixture().await;
    let builder = fx.shop.create_order(fx.customer_id).await.unwrap();

    let err = builder.finish(OrderStatus::Completed).await.unwrap_err();
    assert!(matches!(err, ShopError::EmptyOrder));
    assert!(fx.shop.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn finish_completed_commits_order_and_debits_stock() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();
    builder
        .add_item(AddItemRequest {
            flower_id: fx.rose_id,
            quantity: 4,
        })
        .await
        .unwrap();

    let order = builder.finish(OrderStatus::Completed).await.unwrap();

    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.total, price("10.00"));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].flower_id, fx.rose_id);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 6);
}

#[tokio::test]
async fn finish_pending_leaves_stock_untouched() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();
    builder
        .add_item(AddItemRequest {
            flower_id: fx.rose_id,
            quantity: 4,
        })
        .await
        .unwrap();

    let order = builder.finish(OrderStatus::Pending).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
}

#[tokio::test]
async fn cancel_discards_the_draft() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();
    builder
        .add_item(AddItemRequest {
            flower_id: fx.rose_id,
            quantity: 4,
        })
        .await
        .unwrap();

    builder.cancel();

    assert!(fx.shop.list_orders().await.unwrap().is_empty());
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
}

#[tokio::test]
async fn finish_cancelled_is_rejected() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();
    builder
        .add_item(AddItemRequest {
            flower_id: fx.rose_id,
            quantity: 1,
        })
        .await
        .unwrap();

    let err = builder.finish(OrderStatus::Cancelled).await.unwrap_err();
    assert!(matches!(err, ShopError::InvalidTransition { .. }));
    assert!(fx.shop.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn cumulative_overdraw_is_caught_at_commit() {
    let fx = fixture().await;
    let mut builder = fx.shop.create_order(fx.customer_id).await.unwrap();

    // Each add passes the per-call check against 10 on hand, but together
    // they ask for 12.
    for _ in 0..2 {
        builder
            .add_item(AddItemRequest {
                flower_id: fx.rose_id,
                quantity: 6,
            })
            .await
            .unwrap();
    }

    let err = builder.finish(OrderStatus::Completed).await.unwrap_err();
    assert!(matches!(err, ShopError::InsufficientStock { .. }));
    assert!(fx.shop.list_orders().await.unwrap().is_empty());
    assert_eq!(stock(&fx.store, fx.rose_id).await, 10);
}

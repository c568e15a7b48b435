//! PostgreSQL integration tests.
//!
//! These tests share one PostgreSQL container and need a Docker daemon.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use common::{Money, UserId};
use domain::{
    DeliveryAddress, NewOrder, Notification, NotificationKind, Order, OrderItem, OrderNumber,
    OrderStatus, PaymentMethod, Product,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{MarketStore, OrderStatusUpdate, PostgresStore, StockDecrement, StoreError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_marketplace_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn store() -> PostgresStore {
    let info = get_container_info().await;
    let pool = PgPool::connect(&info.connection_string).await.unwrap();
    PostgresStore::new(pool)
}

fn address() -> DeliveryAddress {
    DeliveryAddress {
        street: "1 Main St".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        zip_code: "411001".to_string(),
        country: "India".to_string(),
    }
}

fn order_with_items(buyer: UserId, items: Vec<OrderItem>, number: i64) -> Order {
    Order::create(NewOrder {
        number: OrderNumber::new(number),
        buyer,
        buyer_name: "Asha".to_string(),
        buyer_phone: "N/A".to_string(),
        items,
        delivery_address: address(),
        payment_method: PaymentMethod::Cod,
    })
}

fn item_of(product: &Product, quantity: u32) -> OrderItem {
    OrderItem {
        product: product.id,
        product_name: product.name.clone(),
        product_image: product.snapshot_image(),
        quantity,
        price: product.price,
        seller: product.seller,
    }
}

#[tokio::test]
#[serial]
async fn sequence_is_monotonic() {
    let store = store().await;
    let name = format!("seq-{}", uuid::Uuid::new_v4());

    let first = store.next_sequence(&name).await.unwrap();
    let second = store.next_sequence(&name).await.unwrap();
    let third = store.next_sequence(&name).await.unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(third, 3);
}

#[tokio::test]
#[serial]
async fn concurrent_sequence_values_are_unique() {
    let store = Arc::new(store().await);
    let name = format!("seq-{}", uuid::Uuid::new_v4());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        let name = name.clone();
        handles.push(tokio::spawn(
            async move { store.next_sequence(&name).await },
        ));
    }

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap().unwrap());
    }
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), 16);
}

#[tokio::test]
#[serial]
async fn product_round_trip_and_update() {
    let store = store().await;
    let seller = UserId::new();
    let mut product = Product::new(seller, "Scarf", "Handwoven", Money::from_cents(500), 4);
    product.image_url = Some("https://cdn.example/scarf.jpg".to_string());

    store.insert_product(&product).await.unwrap();
    let loaded = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Scarf");
    assert_eq!(loaded.price.cents(), 500);
    assert_eq!(loaded.image_url.as_deref(), Some("https://cdn.example/scarf.jpg"));

    let mut changed = loaded.clone();
    changed.stock = 9;
    changed.is_active = false;
    store.update_product(&changed).await.unwrap();
    let reloaded = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(reloaded.stock, 9);
    assert!(!reloaded.is_active);

    assert!(store.delete_product(product.id).await.unwrap());
    assert!(store.product(product.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn cart_upsert_increments_quantity() {
    let store = store().await;
    let buyer = UserId::new();
    let product = Product::new(UserId::new(), "Bag", "", Money::from_cents(900), 10);
    store.insert_product(&product).await.unwrap();

    let (first, created) = store
        .add_cart_item(buyer, product.id, 2, Money::from_cents(900))
        .await
        .unwrap();
    assert!(created);
    let (second, created) = store
        .add_cart_item(buyer, product.id, 1, Money::from_cents(950))
        .await
        .unwrap();

    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.quantity, 3);
    assert_eq!(second.price_snapshot.cents(), 900);

    let rows = store.cart_items(buyer).await.unwrap();
    assert_eq!(rows.len(), 1);

    let updated = store
        .set_cart_quantity(first.id, buyer, 7)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.quantity, 7);

    // Foreign buyer sees nothing.
    assert!(
        store
            .set_cart_quantity(first.id, UserId::new(), 1)
            .await
            .unwrap()
            .is_none()
    );
    assert!(store.remove_cart_item(first.id, buyer).await.unwrap());
}

#[tokio::test]
#[serial]
async fn order_round_trip_preserves_snapshot() {
    let store = store().await;
    let buyer = UserId::new();
    let product = Product::new(UserId::new(), "Shawl", "", Money::from_cents(1500), 6);
    store.insert_product(&product).await.unwrap();

    let order = order_with_items(buyer, vec![item_of(&product, 2)], 101);
    store.insert_order(&order).await.unwrap();

    let loaded = store.order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, order.id);
    assert_eq!(loaded.number, order.number);
    assert_eq!(loaded.items, order.items);
    assert_eq!(loaded.delivery_address, order.delivery_address);
    assert_eq!(loaded.status, OrderStatus::Pending);
    assert_eq!(loaded.total_price.cents(), 3000);

    let mine = store.orders_by_buyer(buyer).await.unwrap();
    assert_eq!(mine.len(), 1);

    let sellers = store.orders_by_seller(product.seller).await.unwrap();
    assert_eq!(sellers.len(), 1);
    assert_eq!(sellers[0].id, order.id);

    // A seller with no items in the order sees nothing.
    assert!(store.orders_by_seller(UserId::new()).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn confirm_unit_decrements_stock_and_deactivates_at_zero() {
    let store = store().await;
    let product = Product::new(UserId::new(), "Scarf", "", Money::from_cents(500), 2);
    store.insert_product(&product).await.unwrap();

    let order = order_with_items(UserId::new(), vec![item_of(&product, 2)], 102);
    store.insert_order(&order).await.unwrap();

    let mut update = OrderStatusUpdate::to(OrderStatus::Confirmed);
    update.decrements = vec![StockDecrement {
        product: product.id,
        quantity: 2,
    }];
    let updated = store
        .update_order_status(order.id, OrderStatus::Pending, update)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Confirmed);

    let reloaded = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(reloaded.stock, 0);
    assert!(!reloaded.is_active);
}

#[tokio::test]
#[serial]
async fn failed_decrement_rolls_back_the_whole_unit() {
    let store = store().await;
    let seller = UserId::new();
    let plenty = Product::new(seller, "Scarf", "", Money::from_cents(500), 10);
    let scarce = Product::new(seller, "Bag", "", Money::from_cents(900), 1);
    store.insert_product(&plenty).await.unwrap();
    store.insert_product(&scarce).await.unwrap();

    let order = order_with_items(
        UserId::new(),
        vec![item_of(&plenty, 2), item_of(&scarce, 5)],
        103,
    );
    store.insert_order(&order).await.unwrap();

    let mut update = OrderStatusUpdate::to(OrderStatus::Confirmed);
    update.decrements = vec![
        StockDecrement {
            product: plenty.id,
            quantity: 2,
        },
        StockDecrement {
            product: scarce.id,
            quantity: 5,
        },
    ];
    let err = store
        .update_order_status(order.id, OrderStatus::Pending, update)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { .. }));

    assert_eq!(store.product(plenty.id).await.unwrap().unwrap().stock, 10);
    assert_eq!(
        store.order(order.id).await.unwrap().unwrap().status,
        OrderStatus::Pending
    );
}

#[tokio::test]
#[serial]
async fn stale_status_guard_rejects_second_confirm() {
    let store = store().await;
    let order = order_with_items(UserId::new(), vec![], 104);
    store.insert_order(&order).await.unwrap();

    store
        .update_order_status(
            order.id,
            OrderStatus::Pending,
            OrderStatusUpdate::to(OrderStatus::Confirmed),
        )
        .await
        .unwrap();

    let err = store
        .update_order_status(
            order.id,
            OrderStatus::Pending,
            OrderStatusUpdate::to(OrderStatus::Confirmed),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::StatusConflict {
            actual: OrderStatus::Confirmed,
            ..
        }
    ));
}

#[tokio::test]
#[serial]
async fn concurrent_confirms_never_drive_stock_negative() {
    let store = Arc::new(store().await);
    let seller = UserId::new();
    let product = Product::new(seller, "Limited", "", Money::from_cents(500), 3);
    store.insert_product(&product).await.unwrap();

    // Five pending orders, each wanting 2 of a stock of 3: at most one
    // confirm can succeed.
    let mut orders = Vec::new();
    for number in 200..205 {
        let order = order_with_items(UserId::new(), vec![item_of(&product, 2)], number);
        store.insert_order(&order).await.unwrap();
        orders.push(order);
    }

    let mut handles = Vec::new();
    for order in &orders {
        let store = store.clone();
        let order_id = order.id;
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            let mut update = OrderStatusUpdate::to(OrderStatus::Confirmed);
            update.decrements = vec![StockDecrement {
                product: product_id,
                quantity: 2,
            }];
            store
                .update_order_status(order_id, OrderStatus::Pending, update)
                .await
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            confirmed += 1;
        }
    }
    assert_eq!(confirmed, 1);

    let reloaded = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(reloaded.stock, 1);
    assert!(reloaded.is_active);
}

#[tokio::test]
#[serial]
async fn notification_inbox_round_trip() {
    let store = store().await;
    let recipient = UserId::new();

    for i in 0..3 {
        store
            .insert_notification(&Notification::new(
                recipient,
                NotificationKind::System,
                format!("n{i}"),
                "hello",
                None,
            ))
            .await
            .unwrap();
    }

    let inbox = store.notifications(recipient, 50).await.unwrap();
    assert_eq!(inbox.len(), 3);
    assert_eq!(store.unread_count(recipient).await.unwrap(), 3);

    let read = store
        .mark_notification_read(inbox[0].id, recipient)
        .await
        .unwrap()
        .unwrap();
    assert!(read.is_read);
    assert_eq!(store.unread_count(recipient).await.unwrap(), 2);

    assert_eq!(store.mark_all_read(recipient).await.unwrap(), 2);
    assert!(store.delete_notification(inbox[1].id, recipient).await.unwrap());
    assert_eq!(store.clear_notifications(recipient).await.unwrap(), 1);
    assert!(store.notifications(recipient, 50).await.unwrap().is_empty());
}

//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use store::{
    NewOrder, NewOrderItem, OrderStatus, PostgresStore, ProductId, ProductQuery,
    StockReservation, Store, StoreSession, TransactionScope, UserId,
};
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

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../sql/schema.sql"))
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

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, products, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn seed_user(store: &PostgresStore, username: &str) -> UserId {
    let id: i32 = sqlx::query_scalar("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id")
        .bind(username)
        .bind(format!("{username}@example.com"))
        .fetch_one(store.pool())
        .await
        .unwrap();
    UserId::new(id)
}

async fn seed_product(
    store: &PostgresStore,
    name: &str,
    price: &str,
    stock: i32,
    category: Option<&str>,
) -> ProductId {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO products (name, price, stock_quantity, category) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(dec(price))
    .bind(stock)
    .bind(category)
    .fetch_one(store.pool())
    .await
    .unwrap();
    ProductId::new(id)
}

async fn stock_of(store: &PostgresStore, product_id: ProductId) -> i32 {
    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
        .bind(product_id.as_i32())
        .fetch_one(store.pool())
        .await
        .unwrap()
}

async fn count(store: &PostgresStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn reserve_stock_decrements_and_returns_price() {
    let store = get_test_store().await;
    let product_id = seed_product(&store, "Widget", "10.00", 5, None).await;

    let mut session = store.begin().await.unwrap();
    let outcome = session.reserve_stock(product_id, 2).await.unwrap();
    assert_eq!(
        outcome,
        StockReservation::Reserved {
            unit_price: dec("10.00")
        }
    );
    session.commit().await.unwrap();

    assert_eq!(stock_of(&store, product_id).await, 3);
}

#[tokio::test]
async fn reserve_stock_distinguishes_missing_from_insufficient() {
    let store = get_test_store().await;
    let product_id = seed_product(&store, "Widget", "10.00", 1, None).await;

    let mut session = store.begin().await.unwrap();
    assert_eq!(
        session.reserve_stock(ProductId::new(999), 1).await.unwrap(),
        StockReservation::NotFound
    );
    assert_eq!(
        session.reserve_stock(product_id, 2).await.unwrap(),
        StockReservation::Insufficient { available: 1 }
    );
    session.rollback().await.unwrap();

    assert_eq!(stock_of(&store, product_id).await, 1);
}

#[tokio::test]
async fn rollback_restores_stock_and_discards_order() {
    let store = get_test_store().await;
    let user_id = seed_user(&store, "alice").await;
    let product_id = seed_product(&store, "Widget", "4.25", 3, None).await;

    let mut session = store.begin().await.unwrap();
    session.reserve_stock(product_id, 3).await.unwrap();
    let order = session
        .insert_order(&NewOrder {
            user_id,
            total_amount: dec("12.75"),
            status: OrderStatus::Pending,
        })
        .await
        .unwrap();
    session
        .insert_order_item(
            order.id,
            &NewOrderItem {
                product_id,
                quantity: 3,
                price_at_purchase: dec("4.25"),
            },
        )
        .await
        .unwrap();
    session.rollback().await.unwrap();

    assert_eq!(stock_of(&store, product_id).await, 3);
    assert_eq!(count(&store, "orders").await, 0);
    assert_eq!(count(&store, "order_items").await, 0);
}

#[tokio::test]
async fn dropped_scope_rolls_back() {
    let store = get_test_store().await;
    let product_id = seed_product(&store, "Widget", "1.00", 2, None).await;

    {
        let mut scope = TransactionScope::begin(&store).await.unwrap();
        scope.session().reserve_stock(product_id, 2).await.unwrap();
    }

    assert_eq!(stock_of(&store, product_id).await, 2);
}

#[tokio::test]
async fn concurrent_reservations_never_oversell() {
    let store = get_test_store().await;
    let product_id = seed_product(&store, "Last one", "99.99", 1, None).await;

    let attempt = |store: PostgresStore| async move {
        let mut session = store.begin().await.unwrap();
        let outcome = session.reserve_stock(product_id, 1).await.unwrap();
        session.commit().await.unwrap();
        outcome
    };

    let (a, b) = tokio::join!(
        tokio::spawn(attempt(store.clone())),
        tokio::spawn(attempt(store.clone()))
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let reserved = outcomes
        .iter()
        .filter(|o| matches!(o, StockReservation::Reserved { .. }))
        .count();
    assert_eq!(reserved, 1);
    assert!(
        outcomes
            .iter()
            .any(|o| *o == StockReservation::Insufficient { available: 0 })
    );
    assert_eq!(stock_of(&store, product_id).await, 0);
}

#[tokio::test]
async fn committed_order_is_visible_in_details() {
    let store = get_test_store().await;
    let user_id = seed_user(&store, "bob").await;
    let pen = seed_product(&store, "Pen", "1.10", 10, None).await;
    let pad = seed_product(&store, "Pad", "2.35", 10, None).await;

    let mut session = store.begin().await.unwrap();
    let order = session
        .insert_order(&NewOrder {
            user_id,
            total_amount: dec("5.65"),
            status: OrderStatus::Pending,
        })
        .await
        .unwrap();
    for (product_id, quantity, price) in [(pen, 3, "1.10"), (pad, 1, "2.35")] {
        session
            .insert_order_item(
                order.id,
                &NewOrderItem {
                    product_id,
                    quantity,
                    price_at_purchase: dec(price),
                },
            )
            .await
            .unwrap();
    }
    session.commit().await.unwrap();

    let details = store.get_order_details(order.id).await.unwrap().unwrap();
    assert_eq!(details.total_amount, dec("5.65"));
    assert_eq!(details.status, "pending");
    assert_eq!(details.username, "bob");
    assert_eq!(details.items.len(), 2);
    assert_eq!(details.items[0].product_name, "Pen");
    assert_eq!(details.items[0].quantity, 3);
    assert_eq!(details.items[1].price, dec("2.35"));

    assert!(
        store
            .get_order_details(store::OrderId::new(order.id.as_i32() + 1))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn get_user_returns_row_or_none() {
    let store = get_test_store().await;
    let user_id = seed_user(&store, "carol").await;

    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.username, "carol");
    assert_eq!(user.email, "carol@example.com");

    assert!(store.get_user(UserId::new(12345)).await.unwrap().is_none());
}

#[tokio::test]
async fn list_products_paginates_and_filters() {
    let store = get_test_store().await;
    for i in 0..3 {
        seed_product(&store, &format!("Novel {i}"), "8.00", 1, Some("books")).await;
    }
    seed_product(&store, "Kettle", "30.00", 1, Some("kitchen")).await;

    let page = store
        .list_products(&ProductQuery::new().category("books").limit(2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.products.len(), 2);

    let second = store
        .list_products(&ProductQuery::new().category("books").limit(2).page(2))
        .await
        .unwrap();
    assert_eq!(second.products.len(), 1);

    let all = store.list_products(&ProductQuery::new()).await.unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.products[0].name, "Kettle");
}

#[tokio::test]
async fn check_constraint_rejects_negative_stock() {
    let store = get_test_store().await;
    let product_id = seed_product(&store, "Widget", "1.00", 1, None).await;

    let result = sqlx::query("UPDATE products SET stock_quantity = stock_quantity - 2 WHERE id = $1")
        .bind(product_id.as_i32())
        .execute(store.pool())
        .await;
    assert!(result.is_err());
    assert_eq!(stock_of(&store, product_id).await, 1);
}

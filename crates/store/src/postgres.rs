use std::time::Duration;

use async_trait::async_trait;
use common::{OrderId, ProductId, UserId};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::{
    InsertedOrder, NewOrder, NewOrderItem, OrderDetailItem, OrderDetails, Product, ProductPage,
    ProductQuery, Result, StockReservation, StoreError, User,
    store::{Store, StoreSession},
};

/// Connection pool sizing.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum number of concurrent database sessions.
    pub max_connections: u32,
    /// How long a request may wait for a free session.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(database_url)
            .await?;
        tracing::info!(
            max_connections = settings.max_connections,
            "database pool ready"
        );
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_detail_item(row: PgRow) -> Result<OrderDetailItem> {
        Ok(OrderDetailItem {
            product_id: ProductId::new(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    type Session = PostgresSession;

    async fn begin(&self) -> Result<PostgresSession> {
        let tx = self.pool.begin().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => StoreError::SessionTimeout,
            other => StoreError::Database(other),
        })?;
        Ok(PostgresSession { tx })
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let category = query.category_filter();

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, stock_quantity, category, created_at, updated_at
            FROM products
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(i64::from(query.page_size()))
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE ($1::TEXT IS NULL OR category = $1)")
                .bind(category)
                .fetch_one(&self.pool)
                .await?;

        let products = rows
            .into_iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>>>()?;

        Ok(ProductPage { products, total })
    }

    async fn get_order_details(&self, order_id: OrderId) -> Result<Option<OrderDetails>> {
        let header = sqlx::query(
            r#"
            SELECT o.id, o.total_amount, o.status, o.created_at, u.username, u.email
            FROM orders o
            JOIN users u ON o.user_id = u.id
            WHERE o.id = $1
            "#,
        )
        .bind(order_id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = sqlx::query(
            r#"
            SELECT oi.product_id, p.name AS product_name, oi.quantity, oi.price_at_purchase AS price
            FROM order_items oi
            JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = $1
            ORDER BY oi.id ASC
            "#,
        )
        .bind(order_id.as_i32())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Self::row_to_detail_item)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(OrderDetails {
            order_id: OrderId::new(header.try_get("id")?),
            total_amount: header.try_get("total_amount")?,
            status: header.try_get("status")?,
            order_date: header.try_get("created_at")?,
            username: header.try_get("username")?,
            email: header.try_get("email")?,
            items,
        }))
    }
}

/// A pooled PostgreSQL connection with an open transaction.
///
/// Dropping the session without committing rolls the transaction back
/// before the connection is reused.
pub struct PostgresSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreSession for PostgresSession {
    async fn reserve_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<StockReservation> {
        // The row lock taken by UPDATE makes concurrent reservations of the
        // same product queue up and re-check the predicate against the
        // committed quantity.
        let reserved: Option<rust_decimal::Decimal> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock_quantity >= $1
            RETURNING price
            "#,
        )
        .bind(quantity)
        .bind(product_id.as_i32())
        .fetch_optional(&mut *self.tx)
        .await?;

        if let Some(unit_price) = reserved {
            return Ok(StockReservation::Reserved { unit_price });
        }

        let available: Option<i32> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(product_id.as_i32())
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(match available {
            Some(available) => StockReservation::Insufficient { available },
            None => StockReservation::NotFound,
        })
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<InsertedOrder> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (user_id, total_amount, status)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(order.user_id.as_i32())
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(InsertedOrder {
            id: OrderId::new(row.try_get("id")?),
            created_at: row.try_get("created_at")?,
        })
    }

    async fn insert_order_item(&mut self, order_id: OrderId, item: &NewOrderItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id.as_i32())
        .bind(item.product_id.as_i32())
        .bind(item.quantity)
        .bind(item.price_at_purchase)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

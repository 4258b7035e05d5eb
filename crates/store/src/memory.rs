use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, ProductId, UserId};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};

use crate::{
    InsertedOrder, NewOrder, NewOrderItem, OrderDetailItem, OrderDetails, Product, ProductPage,
    ProductQuery, Result, StockReservation, StoreError, User,
    store::{Store, StoreSession},
};

/// Default number of sessions the in-memory store hands out at once.
const DEFAULT_MAX_SESSIONS: usize = 20;

#[derive(Debug, Clone)]
struct OrderRow {
    user_id: UserId,
    total_amount: Decimal,
    status: String,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct OrderItemRow {
    order_id: OrderId,
    item: NewOrderItem,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, OrderRow>,
    order_items: Vec<OrderItemRow>,
    next_user_id: i32,
    next_product_id: i32,
    next_order_id: i32,
}

/// Product attributes used to seed the in-memory store.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Decimal, stock_quantity: i32) -> Self {
        Self {
            name: name.into(),
            price,
            stock_quantity,
            category: None,
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// In-memory store implementation for testing.
///
/// Provides the same transactional semantics as the PostgreSQL store:
/// a session works on a private copy of the tables which replaces the
/// shared copy only on commit. Sessions are serialized, which trivially
/// satisfies the per-product reservation guarantee.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    sessions: Arc<Semaphore>,
    fail_on_item_insert: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that hands out at most `max_sessions` sessions at once.
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            sessions: Arc::new(Semaphore::new(max_sessions)),
            fail_on_item_insert: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Configures sessions to fail when inserting order items.
    pub fn set_fail_on_item_insert(&self, fail: bool) {
        self.fail_on_item_insert.store(fail, Ordering::SeqCst);
    }

    /// Inserts a user and returns its ID.
    pub async fn insert_user(&self, username: &str, email: &str) -> UserId {
        let mut tables = self.tables.lock().await;
        tables.next_user_id += 1;
        let id = UserId::new(tables.next_user_id);
        let now = Utc::now();
        tables.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: email.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Inserts a product and returns its ID.
    pub async fn insert_product(&self, product: NewProduct) -> ProductId {
        let mut tables = self.tables.lock().await;
        tables.next_product_id += 1;
        let id = ProductId::new(tables.next_product_id);
        let now = Utc::now();
        tables.products.insert(
            id,
            Product {
                id,
                name: product.name,
                description: None,
                price: product.price,
                stock_quantity: product.stock_quantity,
                category: product.category,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Changes a product's current price.
    pub async fn set_price(&self, product_id: ProductId, price: Decimal) {
        if let Some(product) = self.tables.lock().await.products.get_mut(&product_id) {
            product.price = price;
            product.updated_at = Utc::now();
        }
    }

    /// Returns the committed state of a product.
    pub async fn product(&self, product_id: ProductId) -> Option<Product> {
        self.tables.lock().await.products.get(&product_id).cloned()
    }

    /// Returns the number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Returns the number of committed order items.
    pub async fn order_item_count(&self) -> usize {
        self.tables.lock().await.order_items.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    type Session = InMemorySession;

    async fn begin(&self) -> Result<InMemorySession> {
        let permit = self
            .sessions
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Unavailable("session pool closed".to_string()))?;
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();

        Ok(InMemorySession {
            guard,
            working,
            fail_on_item_insert: self.fail_on_item_insert.load(Ordering::SeqCst),
            _permit: permit,
        })
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<&Product> = tables
            .products
            .values()
            .filter(|p| match query.category_filter() {
                Some(category) => p.category.as_deref() == Some(category),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let products = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size() as usize)
            .cloned()
            .collect();

        Ok(ProductPage { products, total })
    }

    async fn get_order_details(&self, order_id: OrderId) -> Result<Option<OrderDetails>> {
        let tables = self.tables.lock().await;
        let Some(order) = tables.orders.get(&order_id) else {
            return Ok(None);
        };
        let Some(user) = tables.users.get(&order.user_id) else {
            return Ok(None);
        };

        let items = tables
            .order_items
            .iter()
            .filter(|row| row.order_id == order_id)
            .filter_map(|row| {
                let product = tables.products.get(&row.item.product_id)?;
                Some(OrderDetailItem {
                    product_id: row.item.product_id,
                    product_name: product.name.clone(),
                    quantity: row.item.quantity,
                    price: row.item.price_at_purchase,
                })
            })
            .collect();

        Ok(Some(OrderDetails {
            order_id,
            total_amount: order.total_amount,
            status: order.status.clone(),
            order_date: order.created_at,
            username: user.username.clone(),
            email: user.email.clone(),
            items,
        }))
    }
}

/// A session over the in-memory tables.
///
/// Holds the table lock for its whole lifetime. Changes go to a private
/// copy that is published on commit and discarded otherwise.
pub struct InMemorySession {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    fail_on_item_insert: bool,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl StoreSession for InMemorySession {
    async fn reserve_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<StockReservation> {
        let Some(product) = self.working.products.get_mut(&product_id) else {
            return Ok(StockReservation::NotFound);
        };
        if product.stock_quantity < quantity {
            return Ok(StockReservation::Insufficient {
                available: product.stock_quantity,
            });
        }
        product.stock_quantity -= quantity;
        product.updated_at = Utc::now();
        Ok(StockReservation::Reserved {
            unit_price: product.price,
        })
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<InsertedOrder> {
        if !self.working.users.contains_key(&order.user_id) {
            return Err(StoreError::Unavailable(format!(
                "foreign key violation: user {} does not exist",
                order.user_id
            )));
        }
        self.working.next_order_id += 1;
        let id = OrderId::new(self.working.next_order_id);
        let created_at = Utc::now();
        self.working.orders.insert(
            id,
            OrderRow {
                user_id: order.user_id,
                total_amount: order.total_amount,
                status: order.status.as_str().to_string(),
                created_at,
            },
        );
        Ok(InsertedOrder { id, created_at })
    }

    async fn insert_order_item(&mut self, order_id: OrderId, item: &NewOrderItem) -> Result<()> {
        if self.fail_on_item_insert {
            return Err(StoreError::Unavailable(
                "order item insert rejected".to_string(),
            ));
        }
        self.working.order_items.push(OrderItemRow {
            order_id,
            item: item.clone(),
        });
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        let Self {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

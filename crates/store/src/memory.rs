use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    NewOrder, NewProduct, Order, OrderId, OrderItem, OrderStatus, Page, Product, ProductId,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    OrderRepository, ProductRepository, Result, StoreError, batch::attach_children,
};

const PRICE_CONSTRAINT: &str = "product_price_non_negative";
const QUANTITY_CONSTRAINT: &str = "order_item_quantity_positive";

/// Applies a store-side `LIMIT`/`OFFSET` to an already ordered sequence.
fn paginate<T>(rows: impl IntoIterator<Item = T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    rows.into_iter().skip(offset).take(limit).collect()
}

/// In-memory product repository for testing.
///
/// Provides the same ordering, paging and constraint behavior as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored products.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &NewProduct) -> Result<ProductId> {
        if product.price < 0 {
            return Err(StoreError::ConstraintViolation {
                constraint: PRICE_CONSTRAINT.to_string(),
            });
        }

        let id = ProductId::from_uuid(Uuid::new_v4());
        self.products.write().await.push(Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
        });
        Ok(id)
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<Product>> {
        let mut products = self.products.read().await.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(paginate(products, page))
    }
}

struct StoredHeader {
    order: Order,
    sequence: u64,
}

#[derive(Default)]
struct OrderTables {
    headers: Vec<StoredHeader>,
    items: Vec<(OrderId, OrderItem)>,
    next_sequence: u64,
}

impl OrderTables {
    fn items_of(&self, id: OrderId) -> Vec<OrderItem> {
        self.items
            .iter()
            .filter(|(owner, _)| *owner == id)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

/// In-memory order repository for testing.
///
/// Headers and items are kept apart the way the relational schema keeps
/// them; a single lock over both tables gives every operation the same
/// all-or-nothing and consistent-read guarantees as a transaction.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    tables: Arc<RwLock<OrderTables>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored order headers.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.headers.len()
    }

    /// Returns the number of stored item rows across all orders.
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<OrderId> {
        // Constraints are checked before anything is written, so a bad item
        // anywhere in the list leaves no rows behind.
        if order.items.iter().any(|item| item.quantity <= 0) {
            return Err(StoreError::ConstraintViolation {
                constraint: QUANTITY_CONSTRAINT.to_string(),
            });
        }

        let mut tables = self.tables.write().await;
        let id = OrderId::from_uuid(Uuid::new_v4());
        let now = Utc::now();
        let sequence = tables.next_sequence;
        tables.next_sequence += 1;

        tables.headers.push(StoredHeader {
            order: Order {
                id,
                customer_name: order.customer_name.clone(),
                customer_email: order.customer_email.clone(),
                items: Vec::new(),
                status: order.status,
                created_at: now,
                updated_at: now,
            },
            sequence,
        });
        tables
            .items
            .extend(order.items.iter().cloned().map(|item| (id, item)));

        Ok(id)
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Order> {
        let tables = self.tables.read().await;
        let header = tables
            .headers
            .iter()
            .find(|h| h.order.id == id)
            .ok_or_else(|| StoreError::not_found("order", id))?;

        let mut order = header.order.clone();
        order.items = tables.items_of(id);
        Ok(order)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let mut tables = self.tables.write().await;
        let header = tables
            .headers
            .iter_mut()
            .find(|h| h.order.id == id)
            .ok_or_else(|| StoreError::not_found("order", id))?;

        header.order.status = status;
        header.order.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let before = tables.headers.len();
        tables.headers.retain(|h| h.order.id != id);
        if tables.headers.len() == before {
            return Err(StoreError::not_found("order", id));
        }
        tables.items.retain(|(owner, _)| *owner != id);
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;

        let mut headers: Vec<&StoredHeader> = tables.headers.iter().collect();
        headers.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        let mut orders: Vec<Order> = paginate(headers, page)
            .into_iter()
            .map(|h| h.order.clone())
            .collect();

        let page_ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let items = tables
            .items
            .iter()
            .filter(|(owner, _)| page_ids.contains(owner))
            .map(|(owner, item)| (*owner, item.clone()));

        attach_children(&mut orders, items, |o| o.id, |o, item| o.items.push(item));
        Ok(orders)
    }
}

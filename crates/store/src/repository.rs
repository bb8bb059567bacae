use async_trait::async_trait;
use common::{NewOrder, NewProduct, Order, OrderId, OrderStatus, Page, Product, ProductId};

use crate::Result;

/// Persistence contract for catalog products.
///
/// All implementations must be thread-safe (Send + Sync); a single
/// repository is shared by every in-flight request.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product and returns the identifier assigned by the store.
    async fn create(&self, product: &NewProduct) -> Result<ProductId>;

    /// Loads a product by identifier.
    ///
    /// Returns `StoreError::NotFound` if no such product exists.
    async fn get_by_id(&self, id: ProductId) -> Result<Product>;

    /// Deletes a product by identifier.
    ///
    /// Returns `StoreError::NotFound` if no row was removed.
    async fn delete(&self, id: ProductId) -> Result<()>;

    /// Lists products ordered by name ascending, with the page applied by
    /// the store.
    async fn list(&self, page: Page) -> Result<Vec<Product>>;
}

/// Persistence contract for orders and their items.
///
/// An order and its items are written and read as a unit.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order header and all of its items atomically and returns
    /// the identifier assigned by the store.
    ///
    /// Either the header and every item persist, or nothing does.
    async fn create(&self, order: &NewOrder) -> Result<OrderId>;

    /// Loads an order with its items from a single consistent snapshot.
    ///
    /// Returns `StoreError::NotFound` if no such order exists.
    async fn get_by_id(&self, id: OrderId) -> Result<Order>;

    /// Unconditionally sets the status and bumps `updated_at`.
    ///
    /// Returns `StoreError::NotFound` if no such order exists.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<()>;

    /// Deletes an order; its items are removed with it.
    ///
    /// Returns `StoreError::NotFound` if no row was removed.
    async fn delete(&self, id: OrderId) -> Result<()>;

    /// Lists orders newest first, each populated with its items.
    ///
    /// Items for the whole page are fetched in one batched read, never one
    /// query per order.
    async fn list(&self, page: Page) -> Result<Vec<Order>>;
}

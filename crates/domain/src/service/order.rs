//! Order use-cases.

use common::{NewOrder, Order, OrderId, OrderItem, OrderStatus, Page};
use store::OrderRepository;

use crate::error::DomainError;

/// Service for managing orders.
///
/// Fills in the values a caller must not control and forwards to the
/// repository. Transactions live in the repository, not here.
pub struct OrderService<R: OrderRepository> {
    repository: R,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Places an order. The status always starts as `Unspecified`.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn create(
        &self,
        customer_name: &str,
        customer_email: &str,
        items: Vec<OrderItem>,
    ) -> Result<OrderId, DomainError> {
        let order = NewOrder {
            customer_name: customer_name.to_string(),
            customer_email: customer_email.to_string(),
            items,
            status: OrderStatus::Unspecified,
        };
        let id = self.repository.create(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %id, "order created");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Order, DomainError> {
        Ok(self.repository.get_by_id(id).await?)
    }

    /// Sets the status of an order. Any status may follow any other.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), DomainError> {
        self.repository.update_status(id, status).await?;
        tracing::info!(order_id = %id, %status, "order status updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<(), DomainError> {
        self.repository.delete(id).await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Lists orders newest first, each with its items.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, page: Page) -> Result<Vec<Order>, DomainError> {
        Ok(self.repository.list(page).await?)
    }
}

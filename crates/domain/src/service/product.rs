//! Catalog use-cases.

use common::{NewProduct, Page, Product, ProductId};
use store::ProductRepository;

use crate::error::DomainError;

/// Service for managing catalog products.
///
/// A thin pass-through over the repository; store errors propagate unchanged.
pub struct ProductService<R: ProductRepository> {
    repository: R,
}

impl<R: ProductRepository> ProductService<R> {
    /// Creates a new product service over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Adds a product to the catalog and returns its store-assigned id.
    #[tracing::instrument(skip(self, description))]
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        price: i64,
    ) -> Result<ProductId, DomainError> {
        let id = self
            .repository
            .create(&NewProduct::new(name, description, price))
            .await?;

        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %id, "product created");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, DomainError> {
        Ok(self.repository.get_by_id(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), DomainError> {
        self.repository.delete(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Lists products ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, page: Page) -> Result<Vec<Product>, DomainError> {
        Ok(self.repository.list(page).await?)
    }
}

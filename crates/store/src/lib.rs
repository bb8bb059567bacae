//! Persistence layer for the storefront service.
//!
//! Two repositories, one per aggregate. Products are single rows; an order
//! is a header row plus its item rows, written and read as a unit inside a
//! scoped transaction.

pub mod batch;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::{InMemoryOrderRepository, InMemoryProductRepository};
pub use postgres::{PostgresOrderRepository, PostgresProductRepository, run_migrations};
pub use repository::{OrderRepository, ProductRepository};

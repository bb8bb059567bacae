//! Shared model types for the storefront service: identifiers, products,
//! orders and their items.

pub mod model;
pub mod status;
pub mod types;

pub use model::{NewOrder, NewProduct, Order, OrderItem, Product};
pub use status::{OrderStatus, UnknownStatus};
pub use types::{OrderId, Page, ProductId};

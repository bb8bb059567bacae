mod order;
mod product;

pub use order::OrderService;
pub use product::ProductService;

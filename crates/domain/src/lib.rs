//! Use-case layer for the storefront service.
//!
//! This crate sits between the API adapter and the persistence layer:
//! - `ProductService` and `OrderService` forward to their repositories and
//!   fill in defaults the caller must not control
//! - `AdminService` checks administrator credentials and issues and
//!   verifies bearer tokens

pub mod admin;
pub mod error;
pub mod service;

pub use admin::{AdminClaims, AdminCredentials, AdminService, AuthError, DEFAULT_TOKEN_TTL};
pub use error::DomainError;
pub use service::{OrderService, ProductService};

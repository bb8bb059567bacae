//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::admin::AuthError;

/// Errors that can occur during use-case execution.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the store. Passed through unchanged.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication failed or a credential could not be issued.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl DomainError {
    /// Returns true if the underlying store lookup missed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::Store(err) if err.is_not_found())
    }
}

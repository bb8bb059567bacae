use thiserror::Error;

/// Errors that can occur when interacting with the product or order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lookup by identifier matched no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A write was rejected by a table constraint (negative price,
    /// non-positive quantity, ...).
    #[error("Constraint violation: {constraint}")]
    ConstraintViolation { constraint: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if this error is an identifier lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

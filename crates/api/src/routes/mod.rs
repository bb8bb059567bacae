//! Route handlers, one module per RPC service plus the ambient endpoints.

pub mod admin;
pub mod health;
pub mod metrics;
pub mod order;
pub mod product;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;
use crate::messages::Validate;

/// Unwraps a decoded request body and validates it.
pub(crate) fn decode<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T::Validated, ApiError> {
    let Json(message) = payload.map_err(|e| ApiError::InvalidArgument(e.body_text()))?;
    message.validate().map_err(|err| {
        tracing::debug!(error = %err, "request rejected");
        ApiError::from(err)
    })
}

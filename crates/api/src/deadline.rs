//! Per-request deadline.
//!
//! The handler future is dropped when the deadline passes, which also drops
//! any uncommitted store transaction it holds.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Fails the call with `INTERNAL` if it runs longer than `timeout`.
pub async fn enforce_deadline(
    State(timeout): State<Duration>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_owned();

    tokio::time::timeout(timeout, next.run(req))
        .await
        .map_err(|_| {
            metrics::counter!("request_deadline_exceeded_total").increment(1);
            tracing::warn!(%path, ?timeout, "request deadline exceeded");
            ApiError::DeadlineExceeded(timeout)
        })
}

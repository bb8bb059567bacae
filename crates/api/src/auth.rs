//! Admin authorization gate.
//!
//! Every call under the admin namespace except `Login` must carry
//! `authorization: Bearer <token>` with a token issued by
//! [`AdminService::login`]. The verified claims are attached to the request
//! as an extension for the handlers to read.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use domain::{AdminService, AuthError};

use crate::error::ApiError;

/// Path prefix of the admin namespace.
pub const ADMIN_NAMESPACE: &str = "/store.admin.AdminService/";

/// The one admin call reachable without a token.
pub const LOGIN_PATH: &str = "/store.admin.AdminService/Login";

/// Returns true if calls to `path` require an admin token.
pub fn is_protected(path: &str) -> bool {
    path.starts_with(ADMIN_NAMESPACE) && path != LOGIN_PATH
}

/// Rejects protected calls whose bearer token does not verify.
pub async fn require_admin(
    State(admin): State<AdminService>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_protected(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let claims = extract_bearer(req.headers())
        .and_then(|token| admin.verify(token))
        .map_err(|err| {
            metrics::counter!("auth_rejections_total").increment(1);
            tracing::warn!(path = %req.uri().path(), error = %err, "admin call rejected");
            ApiError::Unauthenticated(err)
        })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let header = header
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedCredential)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}

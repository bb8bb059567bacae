//! Administrator login and bearer token handling.
//!
//! The administrator is a single configured identity: a username, an Argon2
//! password hash in PHC format and a symmetric secret used to sign HS256
//! tokens. Nothing here is persisted.

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password did not match. Deliberately does not say which.
    #[error("wrong credentials")]
    WrongCredentials,

    /// No `authorization` metadata on a protected call.
    #[error("missing authorization header")]
    MissingCredential,

    /// The `authorization` metadata is not of the form `Bearer <token>`.
    #[error("invalid authorization header")]
    MalformedCredential,

    /// The token failed decoding, algorithm, signature or expiry checks.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The configured password hash is not a valid PHC string.
    #[error("invalid password hash: {0}")]
    InvalidPasswordHash(String),

    /// A token could not be produced or the password check could not run.
    #[error("credential issuance failed: {0}")]
    Issuance(String),
}

impl AuthError {
    /// Returns true for failures caused by the caller's credential, as
    /// opposed to server-side misconfiguration.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::WrongCredentials
                | AuthError::MissingCredential
                | AuthError::MalformedCredential
                | AuthError::InvalidToken(_)
        )
    }
}

/// Administrator identity loaded from configuration.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 hash in PHC string format.
    pub password_hash: String,
    pub token_secret: String,
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Claims carried by an administrator token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Administrator username.
    pub sub: String,
    /// Issued at, seconds since the epoch.
    pub iat: usize,
    /// Expiry, seconds since the epoch.
    pub exp: usize,
}

/// Login and token verification for the administrator.
#[derive(Clone)]
pub struct AdminService {
    credentials: Arc<AdminCredentials>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AdminService {
    /// Creates the service, rejecting a password hash that cannot be parsed.
    pub fn new(credentials: AdminCredentials) -> Result<Self, AuthError> {
        PasswordHash::new(&credentials.password_hash)
            .map_err(|e| AuthError::InvalidPasswordHash(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(credentials.username.clone());
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(credentials.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(credentials.token_secret.as_bytes()),
            validation,
            credentials: Arc::new(credentials),
        })
    }

    /// Checks the supplied credentials and issues a token.
    ///
    /// The password is verified even when the username is wrong, and both
    /// mismatches produce the same `WrongCredentials` error.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, DomainError> {
        let credentials = self.credentials.clone();
        let password = password.to_string();

        // Argon2 verification blocks; run it on the blocking pool.
        let password_ok = tokio::task::spawn_blocking(move || {
            let hash = PasswordHash::new(&credentials.password_hash)
                .map_err(|e| AuthError::InvalidPasswordHash(e.to_string()))?;
            Ok::<bool, AuthError>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &hash)
                    .is_ok(),
            )
        })
        .await
        .map_err(|e| AuthError::Issuance(e.to_string()))??;

        let username_ok = username == self.credentials.username;

        if !(password_ok && username_ok) {
            metrics::counter!("admin_logins_total", "outcome" => "rejected").increment(1);
            tracing::warn!("admin login rejected");
            return Err(AuthError::WrongCredentials.into());
        }

        let token = self.issue_token(Utc::now())?;
        metrics::counter!("admin_logins_total", "outcome" => "accepted").increment(1);
        tracing::info!("admin login accepted");
        Ok(token)
    }

    /// Signs a token for the administrator as if issued at `issued_at`.
    pub fn issue_token(&self, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let ttl = chrono::Duration::from_std(self.credentials.token_ttl)
            .map_err(|e| AuthError::Issuance(e.to_string()))?;
        let expires_at = issued_at + ttl;

        let claims = AdminClaims {
            sub: self.credentials.username.clone(),
            iat: issued_at.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Issuance(e.to_string()))
    }

    /// Verifies algorithm, signature, subject and expiry of a token.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let data = decode::<AdminClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

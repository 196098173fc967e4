//! Path-segment API key authentication.
//!
//! Clients prefix every data route with their key:
//! `GET /{apikey}/usage/{device_id}`. The middleware compares the first
//! path segment against the configured key in constant time and answers 401
//! before any handler runs on a mismatch.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

/// The configured API key. `Debug` never prints the secret.
#[derive(Clone)]
pub struct SecretApiKey(String);

impl SecretApiKey {
    /// Wrap a key read from configuration.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Constant-time comparison against a provided key.
    ///
    /// When lengths differ, performs a dummy comparison so timing does not
    /// leak length information.
    pub fn matches(&self, provided: &str) -> bool {
        let expected = self.0.as_bytes();
        let provided = provided.as_bytes();
        if provided.len() != expected.len() {
            let _ = expected.ct_eq(expected);
            return false;
        }
        provided.ct_eq(expected).into()
    }
}

impl std::fmt::Debug for SecretApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretApiKey([REDACTED])")
    }
}

/// Middleware guarding the keyed routes.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .uri()
        .path()
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or("");

    if !state.config.api_key.matches(provided) {
        return Err(AppError::Unauthorized("invalid api key".to_string()));
    }
    Ok(next.run(request).await)
}

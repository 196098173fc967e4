//! Standalone signature verification route.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mrv_crypto::verify_hex_inputs;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Query parameters for `verifysign`. All three are required; they are
/// optional here so a missing one can answer 400 instead of a framework
/// rejection.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    /// Hex-encoded Ed25519 public key (64 chars).
    #[serde(rename = "publicKey")]
    pub public_key: Option<String>,
    /// The message that was signed, as a UTF-8 string.
    pub message: Option<String>,
    /// Hex-encoded signature (128 chars).
    pub signature: Option<String>,
}

/// Verification result body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Whether the signature verifies.
    pub valid: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// `GET /{apikey}/verifysign?publicKey=&message=&signature=`.
///
/// Status matrix: missing parameter → 400; undecodable key or signature →
/// 400; well-formed but invalid signature → 401 with `valid: false`;
/// valid → 200 with `valid: true`.
#[utoipa::path(
    get,
    path = "/{apikey}/verifysign",
    params(
        ("apikey" = String, Path, description = "API key"),
        ("publicKey" = String, Query, description = "Hex-encoded Ed25519 public key"),
        ("message" = String, Query, description = "Message that was signed"),
        ("signature" = String, Query, description = "Hex-encoded signature"),
    ),
    responses(
        (status = 200, description = "Signature verifies", body = VerifyResponse),
        (status = 400, description = "Missing or undecodable input", body = ErrorBody),
        (status = 401, description = "Signature does not verify", body = VerifyResponse),
    ),
    tag = "verify"
)]
pub async fn verify_signature(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Response, AppError> {
    let (Some(public_key), Some(message), Some(signature)) =
        (params.public_key, params.message, params.signature)
    else {
        return Err(AppError::BadRequest(
            "missing required parameters: publicKey, message, signature".to_string(),
        ));
    };

    let valid = verify_hex_inputs(&public_key, &message, &signature).map_err(|e| {
        state
            .metrics
            .verifications_total()
            .with_label_values(&["malformed"])
            .inc();
        AppError::from(e)
    })?;

    let outcome = if valid { "valid" } else { "invalid" };
    state
        .metrics
        .verifications_total()
        .with_label_values(&[outcome])
        .inc();

    let status = if valid {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    let body = VerifyResponse {
        valid,
        message: if valid {
            "signature verified".to_string()
        } else {
            "signature does not verify".to_string()
        },
    };
    Ok((status, Json(body)).into_response())
}

//! Credential issuance routes.

use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::Json;
use mrv_core::UsageFact;
use mrv_vc::VerifiableCredential;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Issuance response: the raw fact, the signed credential, and the device
/// public key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceResponse {
    /// The usage fact the credential attests.
    #[serde(rename = "deviceData")]
    pub device_data: UsageFact,
    /// The signed credential.
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: VerifiableCredential,
    /// Hex-encoded public key that verifies the proof.
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// `GET /{apikey}/dailymrv-vc/{device_id}`: issue a credential for the
/// device's most recent usage fact.
///
/// The whole pipeline runs under the configured issuance deadline; an
/// expired deadline answers 503 without touching the key store.
#[utoipa::path(
    get,
    path = "/{apikey}/dailymrv-vc/{device_id}",
    params(
        ("apikey" = String, Path, description = "API key"),
        ("device_id" = String, Path, description = "Device identifier"),
    ),
    responses(
        (status = 200, description = "Signed credential with the attested fact and the device public key"),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 404, description = "No usage recorded for the device", body = ErrorBody),
        (status = 503, description = "Issuance deadline expired", body = ErrorBody),
    ),
    tag = "credentials"
)]
pub async fn issue_daily_credential(
    State(state): State<AppState>,
    Path((_apikey, device_id)): Path<(String, String)>,
) -> Result<Json<IssuanceResponse>, AppError> {
    let latest = match &state.pool {
        Some(pool) => db::latest_usage(pool, &device_id).await?.map(|row| row.to_fact()),
        None => state.usage.latest_fact(&device_id),
    };
    let fact = latest.ok_or_else(|| {
        AppError::NotFound(format!("no usage recorded for device {device_id}"))
    })?;

    let deadline = Instant::now() + Duration::from_secs(state.config.issue_timeout_secs);
    let issued = state.issuer.issue(&fact, Some(deadline)).await?;

    state.metrics.credentials_issued_total().inc();
    tracing::info!(device_id = %device_id, date = %fact.date, "credential issued");

    Ok(Json(IssuanceResponse {
        device_data: fact,
        verifiable_credential: issued.credential,
        public_key: issued.public_key.to_hex(),
    }))
}

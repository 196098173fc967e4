//! HTTP signing client.

use std::time::Duration;

use mrv_crypto::Ed25519Signature;
use serde::{Deserialize, Serialize};

use crate::config::AnchorConfig;

/// Errors from the anchor service or the transport beneath it.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    /// The request exceeded the configured deadline.
    #[error("anchor request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    /// Connection-level failure before a response arrived.
    #[error("anchor transport error: {0}")]
    Transport(String),
    /// The anchor answered with a non-success status.
    #[error("anchor returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    /// The anchor answered 200 but the body was not a usable signature.
    #[error("anchor protocol error: {0}")]
    Protocol(String),
}

#[derive(Serialize)]
struct SignRequest<'a> {
    device_id: &'a str,
    message: String,
}

#[derive(Deserialize)]
struct SignResponse {
    signature: String,
}

/// Client for a remote anchor's signing endpoint.
///
/// Sends `POST {base_url}/sign` with the device id and the hex-encoded
/// message, and expects back `{"signature": "<hex>"}`.
pub struct AnchorSigner {
    http: reqwest::Client,
    sign_url: url::Url,
    timeout_secs: u64,
}

impl AnchorSigner {
    /// Build a client from its configuration.
    pub fn new(config: &AnchorConfig) -> Result<Self, AnchorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnchorError::Transport(e.to_string()))?;
        let sign_url = format!("{}/sign", config.base_url.as_str().trim_end_matches('/'));
        let sign_url = url::Url::parse(&sign_url)
            .map_err(|e| AnchorError::Protocol(format!("invalid anchor url: {e}")))?;
        Ok(Self {
            http,
            sign_url,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Ask the anchor to sign `message` with the key it holds for
    /// `device_id`.
    pub async fn sign(
        &self,
        device_id: &str,
        message: &[u8],
    ) -> Result<Ed25519Signature, AnchorError> {
        let request = SignRequest {
            device_id,
            message: hex_encode(message),
        };
        tracing::debug!(device_id, url = %self.sign_url, "requesting anchor signature");

        let response = self
            .http
            .post(self.sign_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = summarize(&response.text().await.unwrap_or_default());
            tracing::warn!(
                device_id,
                status = status.as_u16(),
                "anchor rejected signing request"
            );
            return Err(AnchorError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body: SignResponse = response.json().await.map_err(|e| self.classify(e))?;
        Ed25519Signature::from_hex(&body.signature)
            .map_err(|e| AnchorError::Protocol(format!("bad signature in anchor response: {e}")))
    }

    fn classify(&self, error: reqwest::Error) -> AnchorError {
        if error.is_timeout() {
            AnchorError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            AnchorError::Transport(error.to_string())
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Keep foreign response bodies short enough for error messages.
fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        let head: String = trimmed.chars().take(200).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_sign_url_joins_without_doubling_slashes() {
        for base in ["http://anchor:9090", "http://anchor:9090/"] {
            let config = AnchorConfig::new(Url::parse(base).unwrap());
            let signer = AnchorSigner::new(&config).unwrap();
            assert_eq!(signer.sign_url.as_str(), "http://anchor:9090/sign");
        }
    }

    #[test]
    fn test_sign_url_preserves_base_path() {
        let config = AnchorConfig::new(Url::parse("http://anchor:9090/hedera/v1").unwrap());
        let signer = AnchorSigner::new(&config).unwrap();
        assert_eq!(signer.sign_url.as_str(), "http://anchor:9090/hedera/v1/sign");
    }

    #[test]
    fn test_summarize_truncates_long_bodies() {
        let long = "x".repeat(500);
        let summary = summarize(&long);
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.ends_with("..."));
        assert_eq!(summarize("  short  "), "short");
    }

    #[test]
    fn test_error_display() {
        let e = AnchorError::Timeout { timeout_secs: 30 };
        assert_eq!(e.to_string(), "anchor request timed out after 30s");
        let e = AnchorError::Status {
            status: 503,
            detail: "maintenance".to_string(),
        };
        assert!(e.to_string().contains("503"));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(hex_encode(b""), "");
    }
}

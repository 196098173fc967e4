//! Environment-driven configuration.
//!
//! Read once at startup. `MRV_API_KEY` is the only required variable;
//! everything else has a default.

use std::path::PathBuf;

use anyhow::Context;
use url::Url;

use crate::auth::SecretApiKey;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default key store root.
pub const DEFAULT_KEYS_DIR: &str = "./keys";
/// Default per-request issuance budget in seconds.
pub const DEFAULT_ISSUE_TIMEOUT_SECS: u64 = 10;
/// Default issuer DID.
pub const DEFAULT_ISSUER_DID: &str = "did:example:issuer";

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen port (`MRV_PORT`).
    pub port: u16,
    /// Path-segment API key (`MRV_API_KEY`, required).
    pub api_key: SecretApiKey,
    /// Key store root directory (`MRV_KEYS_DIR`).
    pub keys_dir: PathBuf,
    /// Issuer DID stamped into credentials (`MRV_ISSUER_DID`).
    pub issuer_did: String,
    /// Per-request issuance deadline in seconds (`MRV_ISSUE_TIMEOUT_SECS`).
    pub issue_timeout_secs: u64,
    /// Remote anchor base URL (`MRV_ANCHOR_URL`); local signing when unset.
    pub anchor_url: Option<Url>,
    /// Anchor request timeout in seconds (`MRV_ANCHOR_TIMEOUT_SECS`).
    pub anchor_timeout_secs: u64,
}

impl ApiConfig {
    /// Build configuration from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("MRV_API_KEY").context("MRV_API_KEY must be set")?;
        if api_key.is_empty() {
            anyhow::bail!("MRV_API_KEY must not be empty");
        }

        let port = std::env::var("MRV_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let keys_dir = std::env::var("MRV_KEYS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_KEYS_DIR));

        let issuer_did =
            std::env::var("MRV_ISSUER_DID").unwrap_or_else(|_| DEFAULT_ISSUER_DID.to_string());

        let issue_timeout_secs = std::env::var("MRV_ISSUE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ISSUE_TIMEOUT_SECS);

        let anchor_url = match std::env::var("MRV_ANCHOR_URL") {
            Ok(raw) => Some(Url::parse(&raw).context("MRV_ANCHOR_URL is not a valid URL")?),
            Err(_) => None,
        };

        let anchor_timeout_secs = std::env::var("MRV_ANCHOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(mrv_anchor_client::config::DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            port,
            api_key: SecretApiKey::new(api_key),
            keys_dir,
            issuer_did,
            issue_timeout_secs,
            anchor_url,
            anchor_timeout_secs,
        })
    }
}

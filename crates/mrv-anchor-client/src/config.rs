//! Anchor client configuration.

use url::Url;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a remote anchor service.
#[derive(Debug, Clone)]
pub struct AnchorConfig {
    /// Base URL of the anchor service. The signing endpoint lives at
    /// `{base_url}/sign`.
    pub base_url: Url,
    /// Hard per-request deadline in seconds.
    pub timeout_secs: u64,
}

impl AnchorConfig {
    /// Configuration for an anchor at `base_url` with the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

//! Issuer identity configuration.

/// The issuer identity stamped into every credential.
///
/// Injected by the caller; the credential builder never reads ambient
/// environment for its metadata.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// DID naming the issuer. Also the base of every `verificationMethod`.
    pub did: String,
    /// Values for the credential's `@context` array.
    pub context: Vec<String>,
    /// Values for the credential's `type` array.
    pub credential_types: Vec<String>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            did: "did:example:issuer".to_string(),
            context: vec!["https://www.w3.org/2018/credentials/v1".to_string()],
            credential_types: vec!["VerifiableCredential".to_string()],
        }
    }
}

impl IssuerConfig {
    /// Default metadata with a custom issuer DID.
    pub fn with_did(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            ..Self::default()
        }
    }

    /// The `verificationMethod` reference for a device's signing key.
    pub fn verification_method(&self, device_id: &str) -> String {
        format!("{}#{}", self.did, device_id)
    }
}

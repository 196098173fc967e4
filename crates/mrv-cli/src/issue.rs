//! # Issue Subcommand
//!
//! Offline credential issuance for a hand-supplied usage fact. Uses the
//! same pipeline as the API server, signing with the local key store;
//! `keygen` happens implicitly for unprovisioned devices.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mrv_core::UsageFact;
use mrv_crypto::FsKeyStore;
use mrv_vc::{CredentialIssuer, IssuerConfig};

/// Arguments for the issue subcommand.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Device identifier the fact belongs to.
    pub device_id: String,

    /// Calendar date of the usage, `YYYY-MM-DD`.
    pub date: String,

    /// Measured daily energy usage.
    pub value: f64,

    /// Root directory holding per-device key material.
    #[arg(long, default_value = "./keys")]
    pub keys_dir: PathBuf,

    /// Issuer DID stamped into the credential.
    #[arg(long, default_value = "did:example:issuer")]
    pub issuer_did: String,
}

/// Issue a credential and return it as pretty-printed JSON.
pub fn run_issue(args: &IssueArgs) -> anyhow::Result<String> {
    let fact = UsageFact::new(&args.device_id, &args.date, args.value);
    let keystore = Arc::new(FsKeyStore::new(&args.keys_dir));
    let issuer = CredentialIssuer::new(IssuerConfig::with_did(&args.issuer_did), keystore);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let issued = runtime.block_on(issuer.issue(&fact, None))?;

    Ok(serde_json::to_string_pretty(&issued.credential)?)
}

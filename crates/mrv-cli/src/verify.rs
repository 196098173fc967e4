//! # Verify Subcommand
//!
//! Offline verification of a detached hex signature. Mirrors the API's
//! `verifysign` endpoint so operators can check credentials without a
//! running server.

use clap::Args;
use mrv_crypto::verify_hex_inputs;

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Public key, 64 hex chars.
    #[arg(long)]
    pub public_key: String,

    /// Message the signature covers, as a UTF-8 string.
    #[arg(long)]
    pub message: String,

    /// Signature, 128 hex chars.
    #[arg(long)]
    pub signature: String,
}

/// Check the signature. `Ok(false)` is a clean negative result; malformed
/// hex is an error.
pub fn run_verify(args: &VerifyArgs) -> anyhow::Result<bool> {
    Ok(verify_hex_inputs(
        &args.public_key,
        &args.message,
        &args.signature,
    )?)
}

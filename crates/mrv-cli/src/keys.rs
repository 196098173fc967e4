//! # Key Subcommands
//!
//! Device key provisioning (`keygen`) and inspection (`show-key`) over a
//! filesystem key store.

use std::path::PathBuf;

use clap::Args;
use mrv_core::KeyStoreError;
use mrv_crypto::{Ed25519KeyPair, FsKeyStore, KeyStore};

/// Arguments shared by the key subcommands.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Device identifier the key pair belongs to.
    pub device_id: String,

    /// Root directory holding per-device key material.
    #[arg(long, default_value = "./keys")]
    pub keys_dir: PathBuf,
}

/// Provision a key pair for a device.
///
/// Idempotent: running it again for a provisioned device reports the
/// existing key instead of replacing it.
pub fn run_keygen(args: &KeyArgs) -> anyhow::Result<String> {
    let store = FsKeyStore::new(&args.keys_dir);
    match store.load(&args.device_id) {
        Ok(existing) => Ok(render(&args.device_id, &existing, "already provisioned")),
        Err(KeyStoreError::NotFound { .. }) => {
            let keypair = store.get_or_create(&args.device_id)?;
            Ok(render(&args.device_id, &keypair, "generated"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Print a device's public key and fingerprint.
pub fn run_show_key(args: &KeyArgs) -> anyhow::Result<String> {
    let store = FsKeyStore::new(&args.keys_dir);
    let keypair = store.load(&args.device_id)?;
    Ok(render(&args.device_id, &keypair, "provisioned"))
}

fn render(device_id: &str, keypair: &Ed25519KeyPair, status: &str) -> String {
    let public_key = keypair.public_key();
    format!(
        "device:      {device_id} ({status})\npublic key:  {public_key}\nfingerprint: {}\n",
        public_key.fingerprint()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: &std::path::Path, device_id: &str) -> KeyArgs {
        KeyArgs {
            device_id: device_id.to_string(),
            keys_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_keygen_creates_then_reports_existing() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "stove-7");

        let first = run_keygen(&args).unwrap();
        assert!(first.contains("generated"));
        assert!(dir.path().join("stove-7").join("public.key").exists());
        assert!(dir.path().join("stove-7").join("private.key").exists());

        let second = run_keygen(&args).unwrap();
        assert!(second.contains("already provisioned"));

        // Same public key both times.
        let hex = |out: &str| {
            out.lines()
                .find(|l| l.starts_with("public key:"))
                .unwrap()
                .to_string()
        };
        assert_eq!(hex(&first), hex(&second));
    }

    #[test]
    fn test_show_key_matches_keygen_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "A1");

        let generated = run_keygen(&args).unwrap();
        let shown = run_show_key(&args).unwrap();
        assert!(shown.contains("provisioned"));
        for line in shown.lines().skip(1) {
            assert!(generated.contains(line), "missing line: {line}");
        }
    }

    #[test]
    fn test_show_key_unknown_device_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_show_key(&args(dir.path(), "ghost")).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_keygen_rejects_traversal_ids() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_keygen(&args(dir.path(), "../escape")).is_err());
    }

    #[test]
    fn test_output_never_contains_private_material() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "B2");
        let out = run_keygen(&args).unwrap();

        let private_hex =
            std::fs::read_to_string(dir.path().join("B2").join("private.key")).unwrap();
        // The private file holds the keypair encoding; its seed half must
        // not leak into CLI output.
        assert!(!out.contains(&private_hex[..64]));
    }
}

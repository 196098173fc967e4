//! Device key storage.
//!
//! Every device owns one Ed25519 key pair, created on first use and reused
//! for every credential after that. [`FsKeyStore`] keeps pairs on disk under
//! `root/{device_id}/` as two hex files, `private.key` (the 64-byte keypair
//! encoding) and `public.key`. [`MemoryKeyStore`] backs tests and ephemeral
//! deployments.
//!
//! First use of a device is atomic per process: concurrent callers racing on
//! a missing key all observe the same generated pair. Cross-process callers
//! sharing a directory are not coordinated.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use mrv_core::KeyStoreError;
use parking_lot::Mutex;
use zeroize::Zeroize;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};

const PRIVATE_KEY_FILE: &str = "private.key";
const PUBLIC_KEY_FILE: &str = "public.key";

/// Storage for per-device Ed25519 key pairs.
///
/// Implementations are safe to share across threads behind an `Arc`.
pub trait KeyStore: Send + Sync {
    /// Return the key pair for `device_id`, generating and persisting one
    /// if none exists yet.
    fn get_or_create(&self, device_id: &str) -> Result<Ed25519KeyPair, KeyStoreError>;

    /// Load an existing key pair, or `NotFound` if the device has none.
    ///
    /// A partially present or corrupt pair is a `Storage` error, never a
    /// silently regenerated key.
    fn load(&self, device_id: &str) -> Result<Ed25519KeyPair, KeyStoreError>;

    /// Persist a key pair, replacing any existing one for the device.
    fn save(&self, device_id: &str, keypair: &Ed25519KeyPair) -> Result<(), KeyStoreError>;
}

/// Filesystem-backed key store.
///
/// Key files are written atomically (temp file, fsync, rename) with mode
/// `0600` inside a `0700` device directory.
pub struct FsKeyStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FsKeyStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    /// The directory this store keeps keys under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn device_dir(&self, device_id: &str) -> PathBuf {
        self.root.join(device_id)
    }
}

impl KeyStore for FsKeyStore {
    fn get_or_create(&self, device_id: &str) -> Result<Ed25519KeyPair, KeyStoreError> {
        validate_device_id(device_id)?;
        // Clone the Arc in its own statement so the shard guard is released
        // before blocking on the device mutex.
        let lock = self.locks.entry(device_id.to_string()).or_default().clone();
        let _guard = lock.lock();

        match self.load(device_id) {
            Ok(keypair) => Ok(keypair),
            Err(KeyStoreError::NotFound { .. }) => {
                let keypair = Ed25519KeyPair::generate();
                self.save(device_id, &keypair)?;
                tracing::info!(
                    device_id,
                    fingerprint = %keypair.public_key().fingerprint(),
                    "generated key pair for device"
                );
                Ok(keypair)
            }
            Err(e) => Err(e),
        }
    }

    fn load(&self, device_id: &str) -> Result<Ed25519KeyPair, KeyStoreError> {
        validate_device_id(device_id)?;
        let dir = self.device_dir(device_id);
        let private_path = dir.join(PRIVATE_KEY_FILE);
        let public_path = dir.join(PUBLIC_KEY_FILE);

        match (private_path.exists(), public_path.exists()) {
            (true, true) => {}
            (false, false) => {
                return Err(KeyStoreError::NotFound {
                    device_id: device_id.to_string(),
                })
            }
            _ => return Err(storage(device_id, "one key half is missing")),
        }

        check_permissions(&private_path, device_id);

        let mut private_hex = fs::read_to_string(&private_path)
            .map_err(|e| storage(device_id, format!("read private key: {e}")))?;
        let keypair = Ed25519KeyPair::from_keypair_hex(private_hex.trim())
            .map_err(|e| storage(device_id, format!("corrupt private key: {e}")));
        private_hex.zeroize();
        let keypair = keypair?;

        let public_hex = fs::read_to_string(&public_path)
            .map_err(|e| storage(device_id, format!("read public key: {e}")))?;
        let public = Ed25519PublicKey::from_hex(public_hex.trim())
            .map_err(|e| storage(device_id, format!("corrupt public key: {e}")))?;

        if public != keypair.public_key() {
            return Err(storage(device_id, "public half does not match private half"));
        }

        Ok(keypair)
    }

    fn save(&self, device_id: &str, keypair: &Ed25519KeyPair) -> Result<(), KeyStoreError> {
        validate_device_id(device_id)?;
        let dir = self.device_dir(device_id);
        fs::create_dir_all(&dir)
            .map_err(|e| storage(device_id, format!("create device dir: {e}")))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))
                .map_err(|e| storage(device_id, format!("restrict device dir: {e}")))?;
        }

        let mut private_hex = keypair.to_keypair_hex();
        let written = write_secure(&dir.join(PRIVATE_KEY_FILE), private_hex.as_bytes())
            .map_err(|reason| storage(device_id, reason));
        private_hex.zeroize();
        written?;

        write_secure(
            &dir.join(PUBLIC_KEY_FILE),
            keypair.public_key().to_hex().as_bytes(),
        )
        .map_err(|reason| storage(device_id, reason))?;

        Ok(())
    }
}

/// In-memory key store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: DashMap<String, Ed25519KeyPair>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn get_or_create(&self, device_id: &str) -> Result<Ed25519KeyPair, KeyStoreError> {
        validate_device_id(device_id)?;
        Ok(self
            .keys
            .entry(device_id.to_string())
            .or_insert_with(Ed25519KeyPair::generate)
            .clone())
    }

    fn load(&self, device_id: &str) -> Result<Ed25519KeyPair, KeyStoreError> {
        validate_device_id(device_id)?;
        self.keys
            .get(device_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| KeyStoreError::NotFound {
                device_id: device_id.to_string(),
            })
    }

    fn save(&self, device_id: &str, keypair: &Ed25519KeyPair) -> Result<(), KeyStoreError> {
        validate_device_id(device_id)?;
        self.keys.insert(device_id.to_string(), keypair.clone());
        Ok(())
    }
}

/// Device ids become directory names, so the character set is restricted to
/// `[A-Za-z0-9._-]` with no leading dot.
fn validate_device_id(device_id: &str) -> Result<(), KeyStoreError> {
    if device_id.is_empty() {
        return Err(invalid(device_id, "must not be empty"));
    }
    if device_id.len() > 64 {
        return Err(invalid(device_id, "must be at most 64 characters"));
    }
    if device_id.starts_with('.') {
        return Err(invalid(device_id, "must not start with a dot"));
    }
    let ok = device_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-');
    if !ok {
        return Err(invalid(
            device_id,
            "allowed characters are letters, digits, dot, underscore, hyphen",
        ));
    }
    Ok(())
}

fn invalid(device_id: &str, reason: &'static str) -> KeyStoreError {
    KeyStoreError::InvalidDeviceId {
        device_id: device_id.to_string(),
        reason,
    }
}

fn storage(device_id: &str, reason: impl Into<String>) -> KeyStoreError {
    KeyStoreError::Storage {
        device_id: device_id.to_string(),
        reason: reason.into(),
    }
}

/// Write `contents` to `path` atomically: temp file with mode 0600, fsync,
/// rename into place.
fn write_secure(path: &Path, contents: &[u8]) -> Result<(), String> {
    let tmp = path.with_extension("key.tmp");
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(&tmp)
        .map_err(|e| format!("open {}: {e}", tmp.display()))?;
    file.write_all(contents)
        .map_err(|e| format!("write {}: {e}", tmp.display()))?;
    file.sync_all()
        .map_err(|e| format!("sync {}: {e}", tmp.display()))?;
    drop(file);
    fs::rename(&tmp, path).map_err(|e| format!("rename into {}: {e}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
fn check_permissions(path: &Path, device_id: &str) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            tracing::warn!(
                device_id,
                path = %path.display(),
                mode = format!("{:o}", mode & 0o777),
                "private key file is readable by group or others"
            );
        }
    }
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path, _device_id: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_store() -> (tempfile::TempDir, FsKeyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsKeyStore::new(dir.path().join("keys"));
        (dir, store)
    }

    #[test]
    fn test_get_or_create_generates_then_reuses() {
        let (_dir, store) = fs_store();
        let first = store.get_or_create("A1").unwrap();
        let second = store.get_or_create("A1").unwrap();
        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(first.sign(b"m"), second.sign(b"m"));
    }

    #[test]
    fn test_load_after_create() {
        let (_dir, store) = fs_store();
        let created = store.get_or_create("stove-7").unwrap();
        let loaded = store.load("stove-7").unwrap();
        assert_eq!(created.public_key(), loaded.public_key());
    }

    #[test]
    fn test_distinct_devices_get_distinct_keys() {
        let (_dir, store) = fs_store();
        let a = store.get_or_create("A1").unwrap();
        let b = store.get_or_create("A2").unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, store) = fs_store();
        assert!(matches!(
            store.load("nobody"),
            Err(KeyStoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_missing_public_half_is_storage_error() {
        let (_dir, store) = fs_store();
        store.get_or_create("A1").unwrap();
        fs::remove_file(store.root().join("A1").join(PUBLIC_KEY_FILE)).unwrap();
        assert!(matches!(
            store.load("A1"),
            Err(KeyStoreError::Storage { .. })
        ));
    }

    #[test]
    fn test_missing_private_half_is_storage_error() {
        let (_dir, store) = fs_store();
        store.get_or_create("A1").unwrap();
        fs::remove_file(store.root().join("A1").join(PRIVATE_KEY_FILE)).unwrap();
        assert!(matches!(
            store.load("A1"),
            Err(KeyStoreError::Storage { .. })
        ));
    }

    #[test]
    fn test_corrupt_private_key_fails_loudly() {
        let (_dir, store) = fs_store();
        store.get_or_create("A1").unwrap();
        let path = store.root().join("A1").join(PRIVATE_KEY_FILE);
        fs::write(&path, "zz".repeat(64)).unwrap();
        assert!(matches!(
            store.load("A1"),
            Err(KeyStoreError::Storage { .. })
        ));
        // get_or_create must not mask corruption by regenerating.
        assert!(matches!(
            store.get_or_create("A1"),
            Err(KeyStoreError::Storage { .. })
        ));
    }

    #[test]
    fn test_truncated_private_key_is_storage_error() {
        let (_dir, store) = fs_store();
        store.get_or_create("A1").unwrap();
        fs::write(store.root().join("A1").join(PRIVATE_KEY_FILE), "aabb").unwrap();
        assert!(matches!(
            store.load("A1"),
            Err(KeyStoreError::Storage { .. })
        ));
    }

    #[test]
    fn test_mismatched_halves_are_detected() {
        let (_dir, store) = fs_store();
        store.get_or_create("A1").unwrap();
        let other = Ed25519KeyPair::generate();
        fs::write(
            store.root().join("A1").join(PUBLIC_KEY_FILE),
            other.public_key().to_hex(),
        )
        .unwrap();
        match store.load("A1") {
            Err(KeyStoreError::Storage { reason, .. }) => {
                assert!(reason.contains("does not match"), "reason: {reason}");
            }
            other => panic!("expected Storage error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_key_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = fs_store();
        store.get_or_create("A1").unwrap();
        let device_dir = store.root().join("A1");
        let dir_mode = fs::metadata(&device_dir).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        let key_mode = fs::metadata(device_dir.join(PRIVATE_KEY_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(key_mode & 0o777, 0o600);
    }

    #[test]
    fn test_private_key_file_is_hex_keypair_encoding() {
        let (_dir, store) = fs_store();
        let keypair = store.get_or_create("A1").unwrap();
        let on_disk = fs::read_to_string(store.root().join("A1").join(PRIVATE_KEY_FILE)).unwrap();
        assert_eq!(on_disk.len(), 128);
        assert_eq!(
            Ed25519KeyPair::from_keypair_hex(&on_disk)
                .unwrap()
                .public_key(),
            keypair.public_key()
        );
        let public_on_disk =
            fs::read_to_string(store.root().join("A1").join(PUBLIC_KEY_FILE)).unwrap();
        assert_eq!(public_on_disk, keypair.public_key().to_hex());
    }

    #[test]
    fn test_concurrent_first_use_yields_one_key() {
        let (_dir, store) = fs_store();
        let barrier = std::sync::Barrier::new(8);
        let keys: Vec<Ed25519PublicKey> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        store.get_or_create("racer").unwrap().public_key()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        // Disk agrees with what every thread observed.
        assert_eq!(store.load("racer").unwrap().public_key(), keys[0]);
    }

    #[test]
    fn test_device_id_validation() {
        let (_dir, store) = fs_store();
        for bad in ["", "../evil", ".hidden", "a/b", "id with spaces"] {
            assert!(
                matches!(
                    store.get_or_create(bad),
                    Err(KeyStoreError::InvalidDeviceId { .. })
                ),
                "accepted {bad:?}"
            );
        }
        let long = "x".repeat(65);
        assert!(matches!(
            store.get_or_create(&long),
            Err(KeyStoreError::InvalidDeviceId { .. })
        ));
        for good in ["A1", "stove-7", "unit_42", "a.b.c", "x"] {
            assert!(store.get_or_create(good).is_ok(), "rejected {good:?}");
        }
    }

    #[test]
    fn test_save_replaces_existing_pair() {
        let (_dir, store) = fs_store();
        let first = store.get_or_create("A1").unwrap();
        let replacement = Ed25519KeyPair::generate();
        store.save("A1", &replacement).unwrap();
        let loaded = store.load("A1").unwrap();
        assert_eq!(loaded.public_key(), replacement.public_key());
        assert_ne!(loaded.public_key(), first.public_key());
    }

    #[test]
    fn test_memory_store_parity() {
        let store = MemoryKeyStore::new();
        assert!(matches!(
            store.load("A1"),
            Err(KeyStoreError::NotFound { .. })
        ));
        let created = store.get_or_create("A1").unwrap();
        assert_eq!(
            store.get_or_create("A1").unwrap().public_key(),
            created.public_key()
        );
        assert_eq!(store.load("A1").unwrap().public_key(), created.public_key());

        let replacement = Ed25519KeyPair::generate();
        store.save("A1", &replacement).unwrap();
        assert_eq!(
            store.load("A1").unwrap().public_key(),
            replacement.public_key()
        );

        assert!(matches!(
            store.get_or_create(".bad"),
            Err(KeyStoreError::InvalidDeviceId { .. })
        ));
    }

    #[test]
    fn test_memory_concurrent_first_use_yields_one_key() {
        let store = MemoryKeyStore::new();
        let barrier = std::sync::Barrier::new(8);
        let keys: Vec<Ed25519PublicKey> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        store.get_or_create("racer").unwrap().public_key()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }
}

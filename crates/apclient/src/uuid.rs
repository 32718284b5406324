//! Persistent client identifier.
//!
//! The server uses the `uuid` field of `Connect` to tell one client
//! installation from another; it only needs to be sufficiently unique
//! and stable across sessions, not a formal UUID. This helper keeps a
//! 32-character hex string in a file, generating it on first use.

use std::fs;
use std::path::Path;

use rand::Rng;

/// Loads the identifier from `path`, generating and writing it when
/// missing or unreadable. With no path, a fresh in-memory identifier is
/// returned every call.
pub fn persistent_uuid(path: Option<&Path>) -> String {
    if let Some(path) = path {
        if let Ok(existing) = fs::read_to_string(path) {
            let existing = existing.trim();
            if is_valid(existing) {
                return existing.to_string();
            }
        }
    }

    let uuid = generate();
    if let Some(path) = path {
        if let Err(error) = fs::write(path, &uuid) {
            tracing::warn!(path = %path.display(), %error, "could not persist client uuid");
        }
    }
    uuid
}

/// Like [`persistent_uuid`], but keeps one identifier per server host in
/// a single fixed-layout file: 256 slots of 32 bytes, indexed by a
/// one-byte hash of the host name. Hash collisions share an identifier,
/// which is acceptable — the identifier only distinguishes client
/// installations, not hosts.
pub fn persistent_uuid_for_host(path: Option<&Path>, host: &str) -> String {
    let Some(path) = path else {
        return generate();
    };

    let slot = host_slot(host);
    let mut table = fs::read(path).unwrap_or_default();
    table.resize(UUID_LEN * SLOT_COUNT, 0);

    let entry = &table[slot * UUID_LEN..(slot + 1) * UUID_LEN];
    if let Ok(existing) = std::str::from_utf8(entry) {
        if is_valid(existing) {
            return existing.to_string();
        }
    }

    let uuid = generate();
    table[slot * UUID_LEN..(slot + 1) * UUID_LEN].copy_from_slice(uuid.as_bytes());
    if let Err(error) = fs::write(path, &table) {
        tracing::warn!(path = %path.display(), %error, "could not persist client uuid");
    }
    uuid
}

const UUID_LEN: usize = 32;
const SLOT_COUNT: usize = 256;

fn host_slot(host: &str) -> usize {
    host.bytes().fold(0u8, u8::wrapping_add) as usize
}

fn is_valid(candidate: &str) -> bool {
    candidate.len() == 32 && candidate.chars().all(|c| c.is_ascii_hexdigit())
}

fn generate() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_without_path_is_well_formed() {
        let uuid = persistent_uuid(None);
        assert!(is_valid(&uuid), "got {uuid:?}");
    }

    #[test]
    fn test_uuid_generation_is_unique() {
        assert_ne!(persistent_uuid(None), persistent_uuid(None));
    }

    #[test]
    fn test_uuid_persists_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uuid");

        let first = persistent_uuid(Some(&path));
        let second = persistent_uuid(Some(&path));

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_uuid_regenerated_when_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uuid");
        fs::write(&path, "not-hex-at-all").unwrap();

        let uuid = persistent_uuid(Some(&path));

        assert!(is_valid(&uuid));
        assert_eq!(fs::read_to_string(&path).unwrap(), uuid);
    }

    #[test]
    fn test_uuid_unwritable_path_still_returns_identifier() {
        let uuid = persistent_uuid(Some(Path::new("/nonexistent-dir/uuid")));
        assert!(is_valid(&uuid));
    }

    #[test]
    fn test_per_host_uuid_stable_for_same_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uuids");

        let first = persistent_uuid_for_host(Some(&path), "ap.example.org");
        let second = persistent_uuid_for_host(Some(&path), "ap.example.org");

        assert_eq!(first, second);
        assert_eq!(fs::metadata(&path).unwrap().len(), (UUID_LEN * SLOT_COUNT) as u64);
    }

    #[test]
    fn test_per_host_uuid_differs_between_hosts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uuids");

        // Pick two hosts landing in different slots.
        let (a, b) = ("a", "b");
        assert_ne!(host_slot(a), host_slot(b));

        let ua = persistent_uuid_for_host(Some(&path), a);
        let ub = persistent_uuid_for_host(Some(&path), b);

        assert_ne!(ua, ub);
        // Both survive in the shared table.
        assert_eq!(persistent_uuid_for_host(Some(&path), a), ua);
        assert_eq!(persistent_uuid_for_host(Some(&path), b), ub);
    }
}

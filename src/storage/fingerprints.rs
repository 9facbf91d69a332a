//! In-memory fingerprint store.
//!
//! Holds the fingerprint of the most recent successful download per file
//! name. Nothing is persisted: a restarted process starts with an empty store
//! and treats every file as never seen.

use std::collections::HashMap;

use crate::models::FileFingerprint;

/// Map of file name to its latest fingerprint.
#[derive(Debug, Clone, Default)]
pub struct FingerprintStore {
    entries: HashMap<String, FileFingerprint>,
}

impl FingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&FileFingerprint> {
        self.entries.get(name)
    }

    /// Record `fingerprint` under `name`, replacing any previous entry.
    pub fn set(&mut self, name: impl Into<String>, fingerprint: FileFingerprint) {
        self.entries.insert(name.into(), fingerprint);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentDigest, HttpValidators};

    fn fingerprint(name: &str, size: u64, fill: u8) -> FileFingerprint {
        FileFingerprint::new(name, size, ContentDigest::from_bytes([fill; 32]))
    }

    #[test]
    fn test_get_absent() {
        let store = FingerprintStore::new();
        assert!(store.get("a.ke0").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = FingerprintStore::new();
        store.set(
            "a.ke0",
            fingerprint("a.ke0", 100, 1).with_validators(HttpValidators {
                etag: Some("\"v1\"".into()),
                last_modified: None,
            }),
        );
        store.set("a.ke0", fingerprint("a.ke0", 120, 3));

        let entry = store.get("a.ke0").unwrap();
        assert_eq!(entry.size, 120);
        assert_eq!(entry.digest, ContentDigest::from_bytes([3; 32]));
        // Total overwrite: nothing of the old entry survives.
        assert!(entry.validators.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut store = FingerprintStore::new();
        store.set("a.ke0", fingerprint("a.ke0", 100, 1));
        store.set("b.ke1", fingerprint("b.ke1", 50, 2));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b.ke1").unwrap().size, 50);
        assert_eq!(store.get("a.ke0").unwrap().size, 100);
    }
}

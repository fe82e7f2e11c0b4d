//! Bounded cache of extracted resume text, keyed by a SHA-256 digest of the
//! uploaded bytes. Re-submitting the same PDF skips parsing.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use sha2::{Digest, Sha256};

/// Content identity of an uploaded file.
pub type ContentKey = [u8; 32];

pub fn content_key(bytes: &[u8]) -> ContentKey {
    Sha256::digest(bytes).into()
}

pub struct ResumeCache {
    entries: Mutex<LruCache<ContentKey, String>>,
}

impl ResumeCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &ContentKey) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: ContentKey, text: String) {
        self.lock().put(key, text);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<ContentKey, String>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

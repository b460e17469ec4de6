use md5::{Digest, Md5};
use std::collections::HashSet;
use tracing::debug;

/// Article id for an entry: hex MD5 of the URL followed by the title.
pub fn fingerprint(url: &str, title: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(url.as_bytes());
    hasher.update(title.as_bytes());
    hex::encode(hasher.finalize())
}

/// Set of fingerprints already emitted during one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from fingerprints that were produced by earlier runs.
    pub fn with_known<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let seen: HashSet<String> = ids.into_iter().collect();
        debug!("Deduplicator seeded with {} known ids", seen.len());
        Self { seen }
    }

    pub fn seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn mark(&mut self, id: String) {
        self.seen.insert(id);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("https://example.com/1", "Title");
        let b = fingerprint("https://example.com/1", "Title");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn fingerprint_matches_md5_of_concatenation() {
        // md5("ab")
        assert_eq!(fingerprint("a", "b"), "187ef4436122d1cc2f40dc2b92f0eba0");
    }

    #[test]
    fn fingerprint_depends_on_both_fields() {
        let base = fingerprint("https://example.com/1", "Title");
        assert_ne!(base, fingerprint("https://example.com/2", "Title"));
        assert_ne!(base, fingerprint("https://example.com/1", "Other"));
    }

    #[test]
    fn mark_then_seen() {
        let mut dedup = Deduplicator::new();
        let id = fingerprint("u", "t");
        assert!(!dedup.seen(&id));
        dedup.mark(id.clone());
        dedup.mark(id.clone());
        assert!(dedup.seen(&id));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn known_ids_are_seen() {
        let dedup = Deduplicator::with_known(vec!["abc".to_string()]);
        assert!(dedup.seen("abc"));
        assert!(!dedup.seen("def"));
    }
}

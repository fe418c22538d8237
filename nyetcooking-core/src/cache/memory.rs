//! In-process fallback store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::types::CacheEntry;

/// Entries live until the process exits or `clear` is called. Nothing
/// expires and nothing is shared with other instances.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub const NAME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, entry: CacheEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn delete(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recipe;

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let store = MemoryStore::new();
        store.set("k", CacheEntry::new(Recipe::default(), "https://a.example/"));
        store.set("k", CacheEntry::new(Recipe::default(), "https://b.example/"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").unwrap().original_url, "https://b.example/");
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new();
        store.set("k", CacheEntry::new(Recipe::default(), "https://a.example/"));
        store.clear();
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
    }
}

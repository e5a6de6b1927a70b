//! High score and unlock persistence
//!
//! The core only knows a string key-value boundary. The browser build backs
//! it with LocalStorage; tests and the native demo use the in-memory store.
//! Missing or malformed records always fall back to documented defaults;
//! loading never fails.

use std::collections::HashMap;

use crate::sim::state::CRAFT_CATALOG;

/// Stringified integer, absent → 0
pub const HIGH_SCORE_KEY: &str = "highScore";
/// JSON boolean array aligned to the craft catalog
pub const UNLOCKS_KEY: &str = "unlocks";

/// String key-value persistence boundary
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and the native demo driver
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// LocalStorage-backed store (browser)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl KvStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        {
            let _ = storage.set_item(key, value);
        }
    }
}

/// Cross-session progress: best score and craft unlock flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedProgress {
    pub high_score: u64,
    /// Aligned to `CRAFT_CATALOG`; index 0 is always true
    pub unlocks: Vec<bool>,
}

impl Default for SavedProgress {
    fn default() -> Self {
        Self {
            high_score: 0,
            unlocks: Self::default_unlocks(),
        }
    }
}

impl SavedProgress {
    /// Fresh profile: only crafts with a zero threshold start unlocked
    fn default_unlocks() -> Vec<bool> {
        CRAFT_CATALOG.iter().map(|c| c.unlock_score == 0).collect()
    }

    /// Load from the store, falling back per field on missing or malformed
    /// records
    pub fn load(store: &dyn KvStore) -> Self {
        let high_score = store
            .get(HIGH_SCORE_KEY)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        let mut unlocks = store
            .get(UNLOCKS_KEY)
            .and_then(|s| serde_json::from_str::<Vec<bool>>(&s).ok())
            .unwrap_or_else(Self::default_unlocks);
        // Tolerate records written against an older catalog
        unlocks.resize(CRAFT_CATALOG.len(), false);
        unlocks[0] = true;
        log::info!(
            "Loaded progress: high score {high_score}, {}/{} crafts unlocked",
            unlocks.iter().filter(|u| **u).count(),
            unlocks.len()
        );
        Self {
            high_score,
            unlocks,
        }
    }

    pub fn save_high_score(&self, store: &mut dyn KvStore) {
        store.set(HIGH_SCORE_KEY, &self.high_score.to_string());
    }

    pub fn save_unlocks(&self, store: &mut dyn KvStore) {
        if let Ok(json) = serde_json::to_string(&self.unlocks) {
            store.set(UNLOCKS_KEY, &json);
        }
    }
}

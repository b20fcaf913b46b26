//! Browser-local persistence for game stats

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// localStorage key of the Pong stats blob
pub const PONG_STATS_KEY: &str = "pongStats";
pub const BOMBERMAN_STATS_KEY: &str = "bombermanStats";

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// No storage in this context (private mode, no window)
    Unavailable(String),
    /// Stored value is not valid JSON for the expected type
    Corrupt(String),
    Write(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            StorageError::Corrupt(msg) => write!(f, "stored data is corrupt: {}", msg),
            StorageError::Write(msg) => write!(f, "failed to write storage: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store used natively and when localStorage is missing
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

/// Read a JSON value, `T::default()` when nothing is stored yet
pub fn load<T, S>(store: &S, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(text) => serde_json::from_str(&text).map_err(|e| StorageError::Corrupt(e.to_string())),
        None => Ok(T::default()),
    }
}

pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let text = serde_json::to_string(value).map_err(|e| StorageError::Write(e.to_string()))?;
    store.set(key, &text)
}

/// Like [`load`], but a corrupt or unreadable value starts over from default
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    load(store, key).unwrap_or_else(|e| {
        log::warn!("Ignoring stored {}: {}", key, e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::session::MatchSummary;
    use game_core::stats::GameStats;
    use game_core::{Difficulty, GameMode, Score, Side};

    #[test]
    fn test_missing_value_loads_default() {
        let store = MemoryStore::new();
        let stats: GameStats = load(&store, PONG_STATS_KEY).unwrap();
        assert_eq!(stats, GameStats::default());
    }

    #[test]
    fn test_stats_survive_save_and_load() {
        let mut store = MemoryStore::new();
        let mut stats = GameStats::new();
        stats.record(&MatchSummary {
            winner: Side::Left,
            score: Score { left: 3, right: 0 },
            duration_secs: 42.0,
            mode: GameMode::Single,
            difficulty: Difficulty::Hard,
            tournament: None,
        });

        save(&mut store, PONG_STATS_KEY, &stats).unwrap();
        let loaded: GameStats = load(&store, PONG_STATS_KEY).unwrap();
        assert_eq!(loaded, stats);

        let raw = store.get(PONG_STATS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"totalGames\":1"), "camelCase blob: {}", raw);
    }

    #[test]
    fn test_corrupt_value_is_reported_and_recovered() {
        let mut store = MemoryStore::new();
        store.set(PONG_STATS_KEY, "{not json").unwrap();
        let result: Result<GameStats, _> = load(&store, PONG_STATS_KEY);
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
        let stats: GameStats = load_or_default(&store, PONG_STATS_KEY);
        assert_eq!(stats.total_games, 0);
    }
}

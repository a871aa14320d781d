//! Recently used item names, persisted as a small versioned list.
//!
//! The record is a JSON array. Current entries are objects
//! (`{"name","lastUseDate","version"}`); legacy entries are bare strings and
//! are migrated on load with the load time as their last use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::storage::StorageBackend;

/// Storage key of the history record.
pub const HISTORY_KEY: &str = "bentostream_saved_streams";

/// Schema version stamped on every entry.
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Default number of names kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One remembered item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub name: String,
    pub last_use_date: DateTime<Utc>,
    #[serde(default = "current_version")]
    pub version: u32,
}

fn current_version() -> u32 {
    HISTORY_SCHEMA_VERSION
}

impl RecentItem {
    fn new(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_lowercase(),
            last_use_date: now,
            version: HISTORY_SCHEMA_VERSION,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Current(RecentItem),
    Legacy(String),
}

/// Most-recently-used item names over a storage backend.
#[derive(Debug)]
pub struct RecentItems<S> {
    storage: S,
    key: String,
    capacity: usize,
    entries: Vec<RecentItem>,
}

impl<S: StorageBackend> RecentItems<S> {
    /// Load the history stored under [`HISTORY_KEY`].
    pub fn load(storage: S) -> Self {
        Self::load_with(storage, HISTORY_KEY, DEFAULT_HISTORY_CAPACITY, Utc::now())
    }

    /// Load using `config`'s history key and capacity.
    pub fn from_config(storage: S, config: &StoreConfig) -> Self {
        Self::load_with(
            storage,
            config.history_key.as_str(),
            config.history_capacity,
            Utc::now(),
        )
    }

    /// Load from `key`, keeping at most `capacity` names. Legacy entries get `now`.
    ///
    /// A corrupt record is logged, removed, and yields an empty history.
    pub fn load_with(storage: S, key: impl Into<String>, capacity: usize, now: DateTime<Utc>) -> Self {
        let key = key.into();
        let mut history = Self {
            storage,
            key,
            capacity,
            entries: Vec::new(),
        };

        let raw = match history.storage.get(&history.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return history,
            Err(err) => {
                tracing::warn!(key = %history.key, error = %err, "failed to read history");
                return history;
            }
        };

        let stored: Vec<StoredEntry> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::error!(key = %history.key, error = %err, "corrupt history record; discarding");
                if let Err(err) = history.storage.remove(&history.key) {
                    tracing::warn!(key = %history.key, error = %err, "failed to remove corrupt history");
                }
                return history;
            }
        };

        let total = stored.len();
        let mut migrated = 0usize;
        let mut entries: Vec<RecentItem> = stored
            .into_iter()
            .map(|entry| match entry {
                StoredEntry::Current(mut item) => {
                    item.version = HISTORY_SCHEMA_VERSION;
                    item
                }
                StoredEntry::Legacy(name) => {
                    migrated += 1;
                    RecentItem::new(&name, now)
                }
            })
            .collect();
        entries.sort_by(|a, b| b.last_use_date.cmp(&a.last_use_date));
        entries.truncate(capacity);
        history.entries = entries;

        if migrated > 0 || total > capacity {
            tracing::debug!(key = %history.key, migrated, total, "rewriting history record");
            history.persist();
        }
        history
    }

    /// Entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[RecentItem] {
        &self.entries
    }

    /// Names, most recent first.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Record one use of `name` now.
    pub fn record(&mut self, name: &str) {
        self.record_at(name, Utc::now());
    }

    /// Record one use of `name` at `now`. Blank names are ignored.
    pub fn record_at(&mut self, name: &str, now: DateTime<Utc>) {
        if self.push_front(name, now) {
            self.persist();
        }
    }

    /// Record several names in order; the last one ends up most recent.
    pub fn record_all<'a>(&mut self, names: impl IntoIterator<Item = &'a str>, now: DateTime<Utc>) {
        let mut changed = false;
        for name in names {
            changed |= self.push_front(name, now);
        }
        if changed {
            self.persist();
        }
    }

    fn push_front(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let entry = RecentItem::new(name, now);
        self.entries.retain(|existing| existing.name != entry.name);
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        true
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to serialize history");
                return;
            }
        };
        if let Err(err) = self.storage.set(&self.key, &json) {
            tracing::warn!(
                key = %self.key,
                backend = self.storage.name(),
                error = %err,
                "failed to persist history"
            );
        }
    }
}

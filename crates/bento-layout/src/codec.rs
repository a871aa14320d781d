//! Persisted layout schema v3 with versioning and migration scaffolding.
//!
//! A [`PersistedLayout`] records one arrangement for one item *count*. Entries
//! reference items by their index in the item list at save time, never by
//! name, so renaming an item in place keeps its saved geometry. The flip side
//! is that a record is only meaningful for a list of the same length, and
//! reordering the list hands saved geometry to whichever item now occupies
//! each index.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "version": 3,
//!   "entries": [
//!     { "x": 0, "y": 0, "w": 9, "h": 8, "kind": "primary", "positionIndex": 0 },
//!     { "x": 9, "y": 0, "w": 3, "h": 8, "kind": "auxiliary", "positionIndex": 0 }
//!   ],
//!   "itemIds": ["s1"]
//! }
//! ```
//!
//! Primary entries are written in visual reading order (top-to-bottom, then
//! left-to-right); the single visible auxiliary entry, if any, comes last.
//! Hidden auxiliary tiles are not stored; they are re-synthesized on load.
//!
//! # Schema Versioning Policy
//!
//! - Records older than [`LAYOUT_SCHEMA_VERSION`] are never reinterpreted:
//!   the loader deletes them and reports a miss.
//! - Records newer than the current version are left untouched (a newer
//!   reader may still want them) and reported as a miss.
//! - `itemIds` is optional identity metadata; when present it must contain
//!   the same items as the list being loaded, in any order.
//!
//! # Usage
//!
//! ```
//! use bento_core::{ItemId, item_ids};
//! use bento_layout::codec::LayoutCodec;
//! use bento_layout::generator::generate;
//! use bento_layout::storage::MemoryStorage;
//!
//! let codec = LayoutCodec::new(MemoryStorage::new());
//! let items = item_ids(["a", "b", "c"]);
//! let arrangement = generate(&items, None);
//!
//! codec.save(&arrangement, &items).unwrap();
//! let loaded = codec.load(3, &items, Some(&ItemId::new("a"))).unwrap();
//! assert_eq!(loaded.arrangement, arrangement);
//! ```

use std::collections::HashSet;

use bento_core::{GridRect, ItemId, Tile, TileKind};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arrangement::Arrangement;
use crate::generator::{DEFAULT_AUXILIARY_SLOT, resolve_auxiliary};
use crate::storage::{StorageBackend, StorageError, StorageResult};

/// Current persisted layout schema version.
pub const LAYOUT_SCHEMA_VERSION: u32 = 3;

/// Default namespace for layout keys.
pub const DEFAULT_KEY_PREFIX: &str = "bentostream-layout";

// =========================================================================
// Core schema types
// =========================================================================

/// One stored tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEntry {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    pub kind: TileKind,
    /// Index into the item list at save time. Always 0 for the auxiliary entry.
    pub position_index: usize,
}

impl PersistedEntry {
    #[must_use]
    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    fn from_rect(rect: GridRect, kind: TileKind, position_index: usize) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            kind,
            position_index,
        }
    }
}

/// Persisted arrangement for one item count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    /// Schema version for invalidation.
    #[serde(default)]
    pub version: u32,
    pub entries: Vec<PersistedEntry>,
    /// Items present at save time, in list order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<String>>,
}

/// A decoded arrangement plus the item its visible auxiliary tile is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLayout {
    pub arrangement: Arrangement,
    pub active: Option<ItemId>,
}

impl PersistedLayout {
    /// Encode an arrangement against the item list it was built for.
    ///
    /// Tiles for items not in `items` are skipped, as are hidden auxiliary
    /// tiles and any visible auxiliary tile after the first.
    #[must_use]
    pub fn encode(arrangement: &Arrangement, items: &[ItemId]) -> Self {
        let mut primaries: Vec<PersistedEntry> = arrangement
            .primaries()
            .filter_map(|tile| {
                let index = items.iter().position(|item| item == tile.item());
                if index.is_none() {
                    tracing::debug!(tile = %tile.id, "skipping primary tile for unknown item");
                }
                index.map(|index| PersistedEntry::from_rect(tile.rect, TileKind::Primary, index))
            })
            .collect();
        primaries.sort_by(|a, b| {
            a.rect()
                .reading_order(&b.rect())
                .then(a.position_index.cmp(&b.position_index))
        });

        let mut entries = primaries;
        if let Some(aux) = arrangement.visible_auxiliary() {
            entries.push(PersistedEntry::from_rect(aux.rect, TileKind::Auxiliary, 0));
        }

        Self {
            version: LAYOUT_SCHEMA_VERSION,
            entries,
            item_ids: Some(items.iter().map(|item| item.as_str().to_owned()).collect()),
        }
    }

    /// Validate structure for a list of `item_count` items.
    pub fn validate(&self, item_count: usize) -> Result<(), LayoutLoadError> {
        if self.version != LAYOUT_SCHEMA_VERSION {
            return Err(LayoutLoadError::UnsupportedVersion {
                found: self.version,
                expected: LAYOUT_SCHEMA_VERSION,
            });
        }

        let primaries = self
            .entries
            .iter()
            .filter(|entry| entry.kind == TileKind::Primary)
            .count();
        if primaries != item_count {
            return Err(LayoutLoadError::EntryCountMismatch {
                expected: item_count,
                found: primaries,
            });
        }

        let auxiliaries = self.entries.len() - primaries;
        if auxiliaries > 1 {
            return Err(LayoutLoadError::MultipleAuxiliaryEntries { found: auxiliaries });
        }

        let mut seen = HashSet::with_capacity(item_count);
        for entry in &self.entries {
            if !entry.rect().fits_columns() {
                return Err(LayoutLoadError::OutOfBounds {
                    position_index: entry.position_index,
                });
            }
            if entry.kind != TileKind::Primary {
                if entry.rect().is_degenerate() {
                    return Err(LayoutLoadError::DegenerateAuxiliary);
                }
                continue;
            }
            if entry.position_index >= item_count || !seen.insert(entry.position_index) {
                return Err(LayoutLoadError::BadPositionIndex {
                    position_index: entry.position_index,
                    item_count,
                });
            }
            if entry.rect().is_degenerate() {
                return Err(LayoutLoadError::DegeneratePrimary {
                    position_index: entry.position_index,
                });
            }
        }
        Ok(())
    }

    /// True when the identity metadata is absent or names exactly `items`.
    #[must_use]
    pub fn matches_items(&self, items: &[ItemId]) -> bool {
        let Some(saved) = &self.item_ids else {
            return true;
        };
        if saved.len() != items.len() {
            return false;
        }
        let mut saved: Vec<&str> = saved.iter().map(String::as_str).collect();
        let mut current: Vec<&str> = items.iter().map(ItemId::as_str).collect();
        saved.sort_unstable();
        current.sort_unstable();
        saved == current
    }

    /// Rebuild an arrangement for `items`. Call [`PersistedLayout::validate`] first.
    ///
    /// The stored auxiliary entry binds to `requested` when it is one of
    /// `items`, else to the first item. Without a stored auxiliary entry, a
    /// valid `requested` item is shown at [`DEFAULT_AUXILIARY_SLOT`] and
    /// otherwise every auxiliary tile stays hidden.
    #[must_use]
    pub fn decode(&self, items: &[ItemId], requested: Option<&ItemId>) -> LoadedLayout {
        let mut tiles: Vec<Tile> = Vec::with_capacity(items.len() * 2);
        let mut stored_aux: Option<GridRect> = None;
        for entry in &self.entries {
            match entry.kind {
                TileKind::Primary => {
                    if let Some(item) = items.get(entry.position_index) {
                        tiles.push(Tile::primary(item.clone(), entry.rect()));
                    }
                }
                TileKind::Auxiliary => stored_aux = Some(entry.rect()),
            }
        }

        let bound = match stored_aux {
            Some(rect) => resolve_auxiliary(items, requested).map(|item| (item, rect)),
            None => requested
                .and_then(|want| items.iter().find(|item| *item == want))
                .map(|item| (item, DEFAULT_AUXILIARY_SLOT)),
        };

        for item in items {
            let rect = match bound {
                Some((active, rect)) if active == item => rect,
                _ => GridRect::HIDDEN,
            };
            tiles.push(Tile::auxiliary(item.clone(), rect));
        }

        let mut arrangement = Arrangement::from_tiles(tiles);
        arrangement.canonicalize(items);
        LoadedLayout {
            arrangement,
            active: bound.map(|(item, _)| item.clone()),
        }
    }
}

// =========================================================================
// Errors
// =========================================================================

/// Why a persisted layout could not be used.
#[derive(Debug, Error)]
pub enum LayoutLoadError {
    #[error("no layout stored under {key:?}")]
    Absent { key: String },
    #[error("cannot load a layout for an empty item list")]
    EmptyItems,
    #[error("item count {count} does not match the {len} items supplied")]
    CountMismatch { count: usize, len: usize },
    #[error("storage read failed: {0}")]
    Storage(#[from] StorageError),
    #[error("malformed layout record: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layout record version {found} is older than {current}; record removed")]
    StaleVersion { found: u32, current: u32 },
    #[error("layout record version {found} is newer than supported {current}")]
    FutureVersion { found: u32, current: u32 },
    #[error("unsupported layout schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("layout record has {found} primary entries, expected {expected}")]
    EntryCountMismatch { expected: usize, found: usize },
    #[error("layout record has {found} auxiliary entries, at most one allowed")]
    MultipleAuxiliaryEntries { found: usize },
    #[error("position index {position_index} is invalid or repeated for {item_count} items")]
    BadPositionIndex {
        position_index: usize,
        item_count: usize,
    },
    #[error("primary entry at position {position_index} has no area")]
    DegeneratePrimary { position_index: usize },
    #[error("auxiliary entry has no area")]
    DegenerateAuxiliary,
    #[error("entry at position {position_index} extends past the grid columns")]
    OutOfBounds { position_index: usize },
    #[error("layout record was saved for a different set of items")]
    IdentityMismatch,
}

impl LayoutLoadError {
    /// True for the plain cache miss (nothing stored), which is not worth a warning.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }
}

/// Why a layout could not be written.
#[derive(Debug, Error)]
pub enum LayoutPersistError {
    #[error("refusing to persist a layout for an empty item list")]
    EmptyItems,
    #[error("failed to serialize layout record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage write failed: {0}")]
    Storage(#[from] StorageError),
}

// =========================================================================
// Migration scaffolding
// =========================================================================

/// Result of migrating a raw record to the current schema.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub layout: PersistedLayout,
    pub from_version: u32,
    pub to_version: u32,
}

/// Errors from layout migration.
#[derive(Debug, Error)]
pub enum LayoutMigrationError {
    #[error("unsupported schema version {version} for migration")]
    UnsupportedVersion { version: u32 },
    #[error("no migration path from v{from} to v{to}")]
    NoMigrationPath { from: u32, to: u32 },
    #[error("deserialization failed during migration: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<serde_json::Value>,
}

/// Read only the `version` field of a raw record.
///
/// A missing, null, negative or fractional version below the current one
/// reads as 0. A fractional version at or above it reads as `u32::MAX`.
pub fn probe_version(raw: &str) -> Result<u32, serde_json::Error> {
    let probe: VersionProbe = serde_json::from_str(raw)?;
    match probe.version {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::Number(number)) => Ok(match number.as_u64() {
            Some(version) => u32::try_from(version).unwrap_or(u32::MAX),
            None => {
                let version = number.as_f64().unwrap_or(0.0);
                if version < f64::from(LAYOUT_SCHEMA_VERSION) {
                    0
                } else {
                    u32::MAX
                }
            }
        }),
        Some(other) => Err(serde_json::Error::custom(format!(
            "invalid layout version {other}"
        ))),
    }
}

/// Migrate a raw record to the current schema version.
///
/// The current version is an identity migration. Earlier versions indexed
/// tiles by item name, which cannot be mapped onto positions without the
/// save-time list order, so they have no migration path.
pub fn migrate_layout(raw: &str) -> Result<MigrationResult, LayoutMigrationError> {
    match probe_version(raw)? {
        LAYOUT_SCHEMA_VERSION => Ok(MigrationResult {
            layout: serde_json::from_str(raw)?,
            from_version: LAYOUT_SCHEMA_VERSION,
            to_version: LAYOUT_SCHEMA_VERSION,
        }),
        v if v > LAYOUT_SCHEMA_VERSION => Err(LayoutMigrationError::UnsupportedVersion { version: v }),
        v => Err(LayoutMigrationError::NoMigrationPath {
            from: v,
            to: LAYOUT_SCHEMA_VERSION,
        }),
    }
}

// =========================================================================
// Codec over a storage backend
// =========================================================================

/// Reads and writes [`PersistedLayout`] records keyed by item count.
#[derive(Debug)]
pub struct LayoutCodec<S> {
    storage: S,
    key_prefix: String,
}

impl<S: StorageBackend> LayoutCodec<S> {
    /// Codec using [`DEFAULT_KEY_PREFIX`].
    pub fn new(storage: S) -> Self {
        Self::with_prefix(storage, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(storage: S, key_prefix: impl Into<String>) -> Self {
        Self {
            storage,
            key_prefix: key_prefix.into(),
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Storage key for an item count: `"<prefix>-<count>"`.
    #[must_use]
    pub fn key_for(&self, count: usize) -> String {
        format!("{}-{count}", self.key_prefix)
    }

    /// Write `arrangement` under the bucket for `items.len()`.
    pub fn save(&self, arrangement: &Arrangement, items: &[ItemId]) -> Result<(), LayoutPersistError> {
        if items.is_empty() {
            return Err(LayoutPersistError::EmptyItems);
        }
        let record = PersistedLayout::encode(arrangement, items);
        let json = serde_json::to_string(&record)?;
        let key = self.key_for(items.len());
        self.storage.set(&key, &json)?;
        tracing::debug!(key = %key, entries = record.entries.len(), "layout saved");
        Ok(())
    }

    /// Load the record for `count`, reporting exactly why it was unusable.
    ///
    /// Records older than the current schema are deleted as a side effect.
    pub fn try_load(
        &self,
        count: usize,
        items: &[ItemId],
        requested: Option<&ItemId>,
    ) -> Result<LoadedLayout, LayoutLoadError> {
        if items.is_empty() {
            return Err(LayoutLoadError::EmptyItems);
        }
        if count != items.len() {
            return Err(LayoutLoadError::CountMismatch {
                count,
                len: items.len(),
            });
        }

        let key = self.key_for(count);
        let raw = self
            .storage
            .get(&key)?
            .ok_or_else(|| LayoutLoadError::Absent { key: key.clone() })?;

        let record = match migrate_layout(&raw) {
            Ok(migrated) => migrated.layout,
            Err(LayoutMigrationError::NoMigrationPath { from, to }) => {
                if let Err(err) = self.storage.remove(&key) {
                    tracing::warn!(key = %key, error = %err, "failed to remove stale layout record");
                }
                return Err(LayoutLoadError::StaleVersion {
                    found: from,
                    current: to,
                });
            }
            Err(LayoutMigrationError::UnsupportedVersion { version }) => {
                return Err(LayoutLoadError::FutureVersion {
                    found: version,
                    current: LAYOUT_SCHEMA_VERSION,
                });
            }
            Err(LayoutMigrationError::DeserializationFailed(err)) => {
                return Err(LayoutLoadError::Parse(err));
            }
        };

        record.validate(count)?;
        if !record.matches_items(items) {
            return Err(LayoutLoadError::IdentityMismatch);
        }
        Ok(record.decode(items, requested))
    }

    /// Load the record for `count`, or `None` on any miss.
    ///
    /// Never fails: problems other than a plain miss are logged as warnings.
    pub fn load(
        &self,
        count: usize,
        items: &[ItemId],
        requested: Option<&ItemId>,
    ) -> Option<LoadedLayout> {
        match self.try_load(count, items, requested) {
            Ok(loaded) => Some(loaded),
            Err(err) if err.is_absent() => {
                tracing::debug!(count, "no saved layout");
                None
            }
            Err(err) => {
                tracing::warn!(
                    count,
                    backend = self.storage.name(),
                    error = %err,
                    "ignoring saved layout"
                );
                None
            }
        }
    }

    /// Delete the record for one item count.
    pub fn remove(&self, count: usize) -> StorageResult<()> {
        self.storage.remove(&self.key_for(count))
    }

    /// Item counts that currently have a record.
    pub fn stored_counts(&self) -> StorageResult<Vec<usize>> {
        let prefix = format!("{}-", self.key_prefix);
        let mut counts: Vec<usize> = self
            .storage
            .keys()?
            .iter()
            .filter_map(|key| key.strip_prefix(&prefix)?.parse().ok())
            .collect();
        counts.sort_unstable();
        Ok(counts)
    }

    /// Delete every layout record under this prefix. Returns how many were removed.
    ///
    /// Keys under the prefix that are not count buckets are left alone.
    pub fn clear_all(&self) -> StorageResult<usize> {
        let counts = self.stored_counts()?;
        for count in &counts {
            self.remove(*count)?;
        }
        Ok(counts.len())
    }
}

// =========================================================================
// Tests
// =========================================================================

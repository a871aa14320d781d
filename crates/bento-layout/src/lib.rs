#![forbid(unsafe_code)]

//! Grid layout engine for Bentostream.
//!
//! Places a list of items (streams) on a 12-column grid. Each item owns a
//! primary tile and an auxiliary tile (its chat panel); at most one auxiliary
//! tile is visible at a time.
//!
//! - [`generator`]: deterministic default arrangements per item count.
//! - [`codec`]: versioned persistence of arrangements, keyed by item count.
//! - [`reconcile`]: what happens to geometry when the item list changes.
//! - [`store`]: the owned state machine tying it together.
//! - [`history`]: recently used item names.
//!
//! Persistence is best-effort throughout. Storage failures are logged with
//! `tracing` and never surface as errors from [`LayoutStore`].

pub mod arrangement;
pub mod codec;
pub mod config;
pub mod generator;
pub mod history;
pub mod reconcile;
pub mod storage;
pub mod store;

pub use arrangement::{Arrangement, ArrangementIssue, ArrangementIssueCode, ArrangementReport};
pub use codec::{
    DEFAULT_KEY_PREFIX, LAYOUT_SCHEMA_VERSION, LayoutCodec, LayoutLoadError, LayoutMigrationError,
    LayoutPersistError, LoadedLayout, MigrationResult, PersistedEntry, PersistedLayout,
    migrate_layout,
};
pub use config::{ConfigError, StoreConfig};
pub use generator::{DEFAULT_AUXILIARY_SLOT, generate};
pub use history::{RecentItem, RecentItems};
pub use reconcile::Reconciliation;
#[cfg(feature = "file-storage")]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use store::{ItemsChangeHook, LayoutStore};

pub use bento_core::{GridRect, ItemId, Tile, TileKey, TileKind};

/// Default arrangement for `items` as a flat tile list.
#[must_use]
pub fn generate_layout(items: &[ItemId], active: Option<&ItemId>) -> Vec<Tile> {
    generate(items, active).into_tiles()
}

/// Persist `tiles` for `items` through `codec`, logging any failure.
///
/// Returns true when the record was written.
pub fn save_layout<S: StorageBackend>(codec: &LayoutCodec<S>, items: &[ItemId], tiles: &[Tile]) -> bool {
    let arrangement = Arrangement::from_tiles(tiles.to_vec());
    match codec.save(&arrangement, items) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(count = items.len(), error = %err, "failed to save layout");
            false
        }
    }
}

/// Load the persisted layout for `count` items as a flat tile list plus the active item.
pub fn load_layout<S: StorageBackend>(
    codec: &LayoutCodec<S>,
    count: usize,
    items: &[ItemId],
    requested: Option<&ItemId>,
) -> Option<(Vec<Tile>, Option<ItemId>)> {
    codec
        .load(count, items, requested)
        .map(|loaded| (loaded.arrangement.into_tiles(), loaded.active))
}

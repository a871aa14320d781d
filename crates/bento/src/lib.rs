#![forbid(unsafe_code)]

//! Bentostream layout engine public facade.
//!
//! Re-exports the grid primitives from `bento-core` and the layout engine
//! from `bento-layout`, plus a prelude for day-to-day usage.
//!
//! ```
//! use bento::prelude::*;
//!
//! let mut store = LayoutStore::new(MemoryStorage::new());
//! store.set_items(["s1", "s2", "s3"]);
//! assert_eq!(store.tiles().len(), 6);
//! assert_eq!(
//!     store.arrangement().auxiliary_rect("s2"),
//!     Some(GridRect::HIDDEN)
//! );
//! ```

// --- Core re-exports -------------------------------------------------------

pub use bento_core::{
    GRID_COLUMNS, GridRect, ItemId, LogFormat, LoggingError, Tile, TileKey, TileKeyParseError,
    TileKind, item_ids,
};

// --- Layout re-exports -----------------------------------------------------

pub use bento_layout::{
    Arrangement, ArrangementIssue, ArrangementIssueCode, ArrangementReport, ConfigError,
    DEFAULT_AUXILIARY_SLOT, DEFAULT_KEY_PREFIX, ItemsChangeHook, LAYOUT_SCHEMA_VERSION,
    LayoutCodec, LayoutLoadError, LayoutMigrationError, LayoutPersistError, LayoutStore,
    LoadedLayout, MemoryStorage, MigrationResult, PersistedEntry, PersistedLayout, RecentItem,
    RecentItems, Reconciliation, StorageBackend, StorageError, StorageResult, StoreConfig,
    generate, generate_layout, load_layout, migrate_layout, save_layout,
};

#[cfg(feature = "file-storage")]
pub use bento_layout::FileStorage;

#[cfg(feature = "tracing-json")]
pub use bento_core::logging::init as init_logging;

/// Everything needed to drive a layout store.
pub mod prelude {
    pub use crate::{
        Arrangement, GridRect, ItemId, LayoutStore, MemoryStorage, Reconciliation,
        StorageBackend, StoreConfig, Tile, TileKey, TileKind,
    };

    pub use crate::{core, layout};
}

pub use bento_core as core;
pub use bento_layout as layout;

//! The layout store: current items, their arrangement, and the active auxiliary target.
//!
//! [`LayoutStore`] is an owned state machine over the triple
//! `(items, arrangement, active)`. Every mutation commits to memory first and
//! then writes through to storage. Write failures are logged and never undo
//! the in-memory change, so the grid stays usable when storage is full or
//! disabled.
//!
//! Operations naming an unknown item are silent no-ops that return `false`;
//! UI state routinely runs slightly ahead of store state.
//!
//! # Example
//!
//! ```
//! use bento_layout::{LayoutStore, MemoryStorage, Reconciliation};
//!
//! let mut store = LayoutStore::new(MemoryStorage::new());
//! assert_eq!(store.set_items(["s1", "s2", "s3"]), Reconciliation::Generated);
//! assert!(store.swap_by_name("s1", "s2"));
//! assert!(store.invariant_report().is_clean());
//! ```

use std::fmt;

use bento_core::{GridRect, ItemId, Tile, TileKey};

use crate::arrangement::{Arrangement, ArrangementReport};
use crate::codec::{LayoutCodec, LoadedLayout};
use crate::config::StoreConfig;
use crate::generator::{DEFAULT_AUXILIARY_SLOT, generate, resolve_auxiliary};
use crate::reconcile::{ReconcilePlan, Reconciliation, plan, remap_positional, sanitize_items};
use crate::storage::StorageBackend;

/// Callback fired with the new item order when the store changes it on the
/// caller's behalf (URL sync and similar).
pub type ItemsChangeHook = Box<dyn FnMut(&[ItemId]) + Send>;

/// Owned layout state with write-through persistence.
pub struct LayoutStore<S> {
    items: Vec<ItemId>,
    arrangement: Arrangement,
    active: Option<ItemId>,
    codec: LayoutCodec<S>,
    persistence_enabled: bool,
    on_items_change: Option<ItemsChangeHook>,
}

impl<S: fmt::Debug> fmt::Debug for LayoutStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("items", &self.items)
            .field("arrangement", &self.arrangement)
            .field("active", &self.active)
            .field("codec", &self.codec)
            .field("persistence_enabled", &self.persistence_enabled)
            .field("on_items_change", &self.on_items_change.is_some())
            .finish()
    }
}

impl<S: StorageBackend> LayoutStore<S> {
    /// Empty store with default settings.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, &StoreConfig::default())
    }

    /// Empty store using `config`'s key prefix and persistence switch.
    pub fn with_config(storage: S, config: &StoreConfig) -> Self {
        Self {
            items: Vec::new(),
            arrangement: Arrangement::empty(),
            active: None,
            codec: LayoutCodec::with_prefix(storage, config.key_prefix.clone()),
            persistence_enabled: config.persistence_enabled,
            on_items_change: None,
        }
    }

    // ---- Queries ----

    /// Current items in list order.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Current arrangement in canonical order.
    #[must_use]
    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    /// Shorthand for `arrangement().tiles()`.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        self.arrangement.tiles()
    }

    /// Item bound to the visible auxiliary tile.
    #[must_use]
    pub fn active_auxiliary(&self) -> Option<&ItemId> {
        self.active.as_ref()
    }

    /// Whether `item` is bound to the visible auxiliary tile.
    #[must_use]
    pub fn is_active_auxiliary(&self, item: &str) -> bool {
        self.active.as_ref().is_some_and(|active| active == item)
    }

    /// Whether any auxiliary tile is visible.
    #[must_use]
    pub fn has_active_auxiliary(&self) -> bool {
        self.active.is_some()
    }

    /// The codec persisting this store's layouts.
    #[must_use]
    pub fn codec(&self) -> &LayoutCodec<S> {
        &self.codec
    }

    /// Whether loads and saves go through storage at all.
    #[must_use]
    pub fn persistence_enabled(&self) -> bool {
        self.persistence_enabled
    }

    /// Check the current state against the arrangement invariants.
    #[must_use]
    pub fn invariant_report(&self) -> ArrangementReport {
        self.arrangement
            .invariant_report(&self.items, self.active.as_ref())
    }

    fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    // ---- Item list ----

    /// Register the single items-change hook, replacing any previous one.
    pub fn set_on_items_change(&mut self, hook: impl FnMut(&[ItemId]) + Send + 'static) {
        self.on_items_change = Some(Box::new(hook));
    }

    /// Remove the items-change hook.
    pub fn clear_on_items_change(&mut self) {
        self.on_items_change = None;
    }

    fn notify_items_changed(&mut self) {
        if let Some(hook) = self.on_items_change.as_mut() {
            hook(&self.items);
        }
    }

    /// Replace the item list and reconcile the arrangement.
    ///
    /// Blank ids are dropped and duplicates keep their first occurrence.
    /// A count change loads the persisted layout for the new count or
    /// generates defaults; a same-length change remaps by slot. Does not
    /// persist and does not fire the items-change hook.
    pub fn set_items<I, T>(&mut self, items: I) -> Reconciliation
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        let new_items = sanitize_items(items);
        let outcome = match plan(&self.items, &new_items) {
            ReconcilePlan::Unchanged => Reconciliation::Unchanged,
            ReconcilePlan::Clear => {
                self.arrangement = Arrangement::empty();
                self.active = None;
                Reconciliation::Cleared
            }
            ReconcilePlan::Remap => {
                let (arrangement, active) = remap_positional(
                    &self.arrangement,
                    &self.items,
                    &new_items,
                    self.active.as_ref(),
                );
                self.arrangement = arrangement;
                self.active = active;
                Reconciliation::Remapped
            }
            ReconcilePlan::LoadOrGenerate => {
                let requested = self.active.take();
                match self.load_for(&new_items, requested.as_ref()) {
                    Some(LoadedLayout {
                        arrangement,
                        active,
                    }) => {
                        self.arrangement = arrangement;
                        self.active = active;
                        Reconciliation::Loaded
                    }
                    None => {
                        self.arrangement = generate(&new_items, requested.as_ref());
                        self.active = resolve_auxiliary(&new_items, requested.as_ref()).cloned();
                        Reconciliation::Generated
                    }
                }
            }
        };
        self.items = new_items;
        if outcome.changed() {
            tracing::debug!(
                outcome = outcome.as_str(),
                count = self.items.len(),
                active = ?self.active.as_ref().map(ItemId::as_str),
                "items reconciled"
            );
        }
        outcome
    }

    /// [`LayoutStore::set_items`], then fire the items-change hook if anything changed.
    pub fn set_items_notifying<I, T>(&mut self, items: I) -> Reconciliation
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        let outcome = self.set_items(items);
        if outcome.changed() {
            self.notify_items_changed();
        }
        outcome
    }

    fn load_for(&self, items: &[ItemId], requested: Option<&ItemId>) -> Option<LoadedLayout> {
        if !self.persistence_enabled {
            return None;
        }
        self.codec.load(items.len(), items, requested)
    }

    // ---- Swaps ----

    /// Exchange the primary geometry of two items. Their list order is unchanged.
    pub fn swap_by_name(&mut self, a: &str, b: &str) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            tracing::debug!(a, b, "ignoring swap");
            return false;
        }
        if !self
            .arrangement
            .swap_rects(&TileKey::primary(a), &TileKey::primary(b))
        {
            return false;
        }
        self.persist();
        true
    }

    /// [`LayoutStore::swap_by_name`] addressed by list index.
    pub fn swap_by_index(&mut self, i: usize, j: usize) -> bool {
        let (Some(a), Some(b)) = (self.items.get(i).cloned(), self.items.get(j).cloned()) else {
            tracing::debug!(i, j, "ignoring swap of out-of-range index");
            return false;
        };
        self.swap_by_name(a.as_str(), b.as_str())
    }

    /// Exchange two items' places in the list together with their primary geometry.
    ///
    /// The tile at each list slot stays where it is while the labels trade
    /// places. Persists and fires the items-change hook.
    pub fn swap_order_by_name(&mut self, a: &str, b: &str) -> bool {
        let (Some(i), Some(j)) = (
            self.items.iter().position(|item| item == a),
            self.items.iter().position(|item| item == b),
        ) else {
            tracing::debug!(a, b, "ignoring order swap");
            return false;
        };
        if i == j {
            return false;
        }
        self.items.swap(i, j);
        self.arrangement
            .swap_rects(&TileKey::primary(a), &TileKey::primary(b));
        self.arrangement.canonicalize(&self.items);
        self.persist();
        self.notify_items_changed();
        true
    }

    /// Move `item` to `index` in the list, shifting the items in between.
    ///
    /// Like [`LayoutStore::swap_order_by_name`], primary geometry stays with
    /// the list slot. Persists and fires the items-change hook. Unknown
    /// items, out-of-range indices and moves onto the current index are no-ops.
    pub fn move_item_to_position(&mut self, item: &str, index: usize) -> bool {
        let Some(from) = self.items.iter().position(|existing| existing == item) else {
            tracing::debug!(item, "ignoring move of unknown item");
            return false;
        };
        if index >= self.items.len() || from == index {
            tracing::debug!(item, index, "ignoring move");
            return false;
        }
        let slots: Vec<Option<GridRect>> = self
            .items
            .iter()
            .map(|existing| self.arrangement.primary_rect(existing.as_str()))
            .collect();
        let moved = self.items.remove(from);
        self.items.insert(index, moved);
        for (existing, slot) in self.items.iter().zip(slots) {
            if let Some(rect) = slot {
                self.arrangement
                    .set_rect(&TileKey::primary(existing.as_str()), rect);
            }
        }
        self.arrangement.canonicalize(&self.items);
        self.persist();
        self.notify_items_changed();
        true
    }

    // ---- Auxiliary tile ----

    /// Move the visible auxiliary slot to `target`.
    ///
    /// The currently visible auxiliary tile's geometry is exchanged with
    /// `target`'s. With nothing visible this behaves like
    /// [`LayoutStore::add_auxiliary`].
    pub fn set_active_auxiliary(&mut self, target: &str) -> bool {
        if !self.contains(target) || self.is_active_auxiliary(target) {
            tracing::debug!(target, "ignoring auxiliary change");
            return false;
        }
        let Some(visible) = self.arrangement.visible_auxiliary().map(|tile| tile.id.clone()) else {
            return self.add_auxiliary(target);
        };
        let target_key = TileKey::auxiliary(target);
        self.arrangement.swap_rects(&visible, &target_key);
        self.arrangement.hide_auxiliaries_except(Some(&target_key));
        self.active = Some(target_key.item);
        self.persist();
        true
    }

    /// Hide the visible auxiliary tile and clear the active target.
    pub fn clear_active_auxiliary(&mut self) -> bool {
        if self.active.is_none() && self.arrangement.visible_auxiliary().is_none() {
            return false;
        }
        self.arrangement.hide_auxiliaries_except(None);
        self.active = None;
        self.persist();
        true
    }

    /// Show `target`'s auxiliary tile at the default slot, hiding any other.
    pub fn add_auxiliary(&mut self, target: &str) -> bool {
        if !self.contains(target) {
            tracing::debug!(target, "ignoring auxiliary add for unknown item");
            return false;
        }
        let key = TileKey::auxiliary(target);
        self.arrangement.set_rect(&key, DEFAULT_AUXILIARY_SLOT);
        self.arrangement.hide_auxiliaries_except(Some(&key));
        self.active = Some(key.item);
        self.persist();
        true
    }

    /// Hide `target`'s auxiliary tile. Clears the active target if it was `target`.
    pub fn remove_auxiliary(&mut self, target: &str) -> bool {
        if !self.contains(target) {
            tracing::debug!(target, "ignoring auxiliary removal for unknown item");
            return false;
        }
        self.arrangement
            .set_rect(&TileKey::auxiliary(target), GridRect::HIDDEN);
        if self.is_active_auxiliary(target) {
            self.active = None;
        }
        self.persist();
        true
    }

    // ---- External edits and persistence ----

    /// Replace the arrangement with tiles produced by a drag or resize.
    ///
    /// The supplied tiles are normalized against the current items: missing
    /// tiles keep their current geometry, unknown items are dropped, and at
    /// most one auxiliary tile stays visible. Persists.
    pub fn commit_external_layout_edit(&mut self, tiles: Vec<Tile>) {
        let (arrangement, active) = Arrangement::normalize(
            tiles,
            &self.items,
            &self.arrangement,
            self.active.as_ref(),
        );
        self.arrangement = arrangement;
        self.active = active;
        self.persist();
    }

    /// Forget the persisted layout for `count`. If the store currently holds
    /// `count` items, regenerate defaults. Returns true when regenerated.
    pub fn reset_for_count(&mut self, count: usize) -> bool {
        if let Err(err) = self.codec.remove(count) {
            tracing::warn!(count, error = %err, "failed to remove persisted layout");
        }
        if count == 0 || self.items.len() != count {
            return false;
        }
        self.arrangement = generate(&self.items, self.active.as_ref());
        self.active = resolve_auxiliary(&self.items, self.active.as_ref()).cloned();
        tracing::debug!(count, "layout reset to defaults");
        true
    }

    /// Persist the current arrangement now. Returns true if it was written.
    pub fn save_to_storage(&self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.persist()
    }

    /// Delete every persisted layout under this store's prefix.
    ///
    /// Returns how many records were removed.
    pub fn clear_all_layouts(&self) -> usize {
        match self.codec.clear_all() {
            Ok(removed) => {
                tracing::debug!(removed, "cleared persisted layouts");
                removed
            }
            Err(err) => {
                tracing::warn!(
                    backend = self.codec.storage().name(),
                    error = %err,
                    "failed to clear persisted layouts"
                );
                0
            }
        }
    }

    fn persist(&self) -> bool {
        if !self.persistence_enabled || self.items.is_empty() {
            return false;
        }
        match self.codec.save(&self.arrangement, &self.items) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    key = %self.codec.key_for(self.items.len()),
                    backend = self.codec.storage().name(),
                    error = %err,
                    "failed to persist layout"
                );
                false
            }
        }
    }
}

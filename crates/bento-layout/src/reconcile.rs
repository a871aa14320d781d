//! Reconciliation policy: what happens to the arrangement when the item list changes.
//!
//! The decision hinges only on whether the list length changed:
//!
//! | Old → new | Plan |
//! |---|---|
//! | equal lists | [`ReconcilePlan::Unchanged`] |
//! | anything → empty | [`ReconcilePlan::Clear`] |
//! | same length, different members or order | [`ReconcilePlan::Remap`] |
//! | different length | [`ReconcilePlan::LoadOrGenerate`] |
//!
//! # Positional remap
//!
//! A same-length update keeps primary geometry by *slot*: the tile at list
//! index `i` keeps its rectangle and is relabeled to the new item at index
//! `i`. Renaming an item in place therefore keeps its tile, and reordering the
//! list hands each tile to whichever item now sits in its slot.
//!
//! The visible auxiliary tile follows the active item by *name*. If the active
//! item is no longer listed, every auxiliary tile is hidden and the active
//! target becomes empty.

use std::collections::HashSet;

use bento_core::{GridRect, ItemId, Tile};
use serde::{Deserialize, Serialize};

use crate::arrangement::Arrangement;

/// Outcome of a `set_items` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// New list equals the current one; nothing changed.
    Unchanged,
    /// List became empty; arrangement cleared.
    Cleared,
    /// Same length; geometry relabeled by slot.
    Remapped,
    /// Different length; a persisted layout for the new count was used.
    Loaded,
    /// Different length; no usable persisted layout, defaults generated.
    Generated,
}

impl Reconciliation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Cleared => "cleared",
            Self::Remapped => "remapped",
            Self::Loaded => "loaded",
            Self::Generated => "generated",
        }
    }

    /// True when the arrangement or item list was replaced.
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Which path a list update takes, before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePlan {
    Unchanged,
    Clear,
    Remap,
    LoadOrGenerate,
}

/// Choose the reconciliation path for an `old → new` list update.
#[must_use]
pub fn plan(old: &[ItemId], new: &[ItemId]) -> ReconcilePlan {
    if old == new {
        ReconcilePlan::Unchanged
    } else if new.is_empty() {
        ReconcilePlan::Clear
    } else if old.len() == new.len() {
        ReconcilePlan::Remap
    } else {
        ReconcilePlan::LoadOrGenerate
    }
}

/// Drop blank ids and keep the first occurrence of each duplicate.
pub fn sanitize_items<I, T>(items: I) -> Vec<ItemId>
where
    I: IntoIterator<Item = T>,
    T: Into<ItemId>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.into();
        if item.is_blank() {
            tracing::debug!("dropping blank item id");
            continue;
        }
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

/// Relabel `arrangement` (built for `old`) onto the same-length list `new`.
///
/// Returns the remapped arrangement and the surviving active target.
#[must_use]
pub fn remap_positional(
    arrangement: &Arrangement,
    old: &[ItemId],
    new: &[ItemId],
    active: Option<&ItemId>,
) -> (Arrangement, Option<ItemId>) {
    debug_assert_eq!(old.len(), new.len());
    let mut tiles: Vec<Tile> = Vec::with_capacity(new.len() * 2);
    for (old_item, new_item) in old.iter().zip(new) {
        if let Some(rect) = arrangement.primary_rect(old_item.as_str()) {
            tiles.push(Tile::primary(new_item.clone(), rect));
        }
    }

    let surviving = active.filter(|item| new.contains(item));
    if let Some(item) = surviving {
        let rect = arrangement
            .auxiliary_rect(item.as_str())
            .unwrap_or(GridRect::HIDDEN);
        tiles.push(Tile::auxiliary(item.clone(), rect));
    } else if let Some(item) = active {
        tracing::debug!(item = %item, "active auxiliary dropped by remap");
    }

    Arrangement::normalize(tiles, new, &Arrangement::empty(), surviving)
}

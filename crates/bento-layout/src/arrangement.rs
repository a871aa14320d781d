//! The full set of positioned tiles for the current item list.
//!
//! # Invariants
//!
//! For an item list of length `n` an arrangement holds exactly `2 * n` tiles:
//! one primary and one auxiliary tile per item. At most one auxiliary tile is
//! visible; all others are [`GridRect::HIDDEN`] but still present so the
//! renderer keeps a stable element for every item.
//!
//! Arrangements are kept in canonical order (primaries in item order, then
//! auxiliaries in item order) so two arrangements describing the same grid
//! compare equal.

use std::collections::HashSet;

use bento_core::{GRID_COLUMNS, GridRect, ItemId, Tile, TileKey, TileKind};
use serde::{Deserialize, Serialize};

/// Positioned tiles for one item list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arrangement {
    tiles: Vec<Tile>,
}

impl Arrangement {
    /// An arrangement with no tiles (the only valid arrangement for zero items).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap tiles as-is. No invariant is enforced; see [`Arrangement::normalize`].
    #[must_use]
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    /// Lookup a tile by key.
    #[must_use]
    pub fn get(&self, key: &TileKey) -> Option<&Tile> {
        self.tiles.iter().find(|tile| &tile.id == key)
    }

    #[must_use]
    pub fn rect(&self, key: &TileKey) -> Option<GridRect> {
        self.get(key).map(|tile| tile.rect)
    }

    #[must_use]
    pub fn primary_rect(&self, item: &str) -> Option<GridRect> {
        self.find(TileKind::Primary, item).map(|tile| tile.rect)
    }

    #[must_use]
    pub fn auxiliary_rect(&self, item: &str) -> Option<GridRect> {
        self.find(TileKind::Auxiliary, item).map(|tile| tile.rect)
    }

    /// Primary tiles in stored order.
    pub fn primaries(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles
            .iter()
            .filter(|tile| tile.kind() == TileKind::Primary)
    }

    /// Auxiliary tiles in stored order.
    pub fn auxiliaries(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles
            .iter()
            .filter(|tile| tile.kind() == TileKind::Auxiliary)
    }

    /// The first visible auxiliary tile, if any.
    #[must_use]
    pub fn visible_auxiliary(&self) -> Option<&Tile> {
        self.auxiliaries().find(|tile| tile.is_visible())
    }

    /// Item bound to the visible auxiliary tile.
    #[must_use]
    pub fn active_auxiliary(&self) -> Option<&ItemId> {
        self.visible_auxiliary().map(Tile::item)
    }

    fn find(&self, kind: TileKind, item: &str) -> Option<&Tile> {
        self.tiles
            .iter()
            .find(|tile| tile.kind() == kind && tile.item() == item)
    }

    fn find_mut(&mut self, key: &TileKey) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|tile| &tile.id == key)
    }

    /// Overwrite one tile's geometry. Returns false for an unknown key.
    pub(crate) fn set_rect(&mut self, key: &TileKey, rect: GridRect) -> bool {
        match self.find_mut(key) {
            Some(tile) => {
                tile.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Exchange the geometry of two tiles, keeping their identities.
    ///
    /// Returns false (and changes nothing) when either key is missing.
    pub(crate) fn swap_rects(&mut self, a: &TileKey, b: &TileKey) -> bool {
        let (Some(ia), Some(ib)) = (
            self.tiles.iter().position(|tile| &tile.id == a),
            self.tiles.iter().position(|tile| &tile.id == b),
        ) else {
            return false;
        };
        if ia == ib {
            return false;
        }
        let rect_a = self.tiles[ia].rect;
        self.tiles[ia].rect = self.tiles[ib].rect;
        self.tiles[ib].rect = rect_a;
        true
    }

    /// Hide every visible auxiliary tile except `keep`.
    pub(crate) fn hide_auxiliaries_except(&mut self, keep: Option<&TileKey>) {
        for tile in &mut self.tiles {
            if tile.kind() == TileKind::Auxiliary && Some(&tile.id) != keep {
                tile.rect = GridRect::HIDDEN;
            }
        }
    }

    /// Sort into canonical order: primaries then auxiliaries, each in item order.
    ///
    /// Tiles whose item is not in `items` sort last, in key order.
    pub fn canonicalize(&mut self, items: &[ItemId]) {
        let slot = |item: &ItemId| items.iter().position(|i| i == item).unwrap_or(usize::MAX);
        self.tiles.sort_by(|a, b| {
            a.kind()
                .cmp(&b.kind())
                .then_with(|| slot(a.item()).cmp(&slot(b.item())))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    /// Rebuild a well-formed arrangement for `items` out of arbitrary tiles.
    ///
    /// - Tiles for unknown items and duplicate keys (after the first) are dropped.
    /// - A missing or zero-area primary takes its geometry from `fallback`, or
    ///   is stacked below everything else when `fallback` has none.
    /// - Geometry is clamped to the grid's columns.
    /// - Of the visible auxiliary tiles, the one for `preferred_active` wins if
    ///   present, else the first in item order; the rest are hidden. Missing
    ///   auxiliary tiles are synthesized hidden.
    ///
    /// Returns the arrangement and the item bound to the visible auxiliary tile.
    #[must_use]
    pub fn normalize(
        tiles: Vec<Tile>,
        items: &[ItemId],
        fallback: &Arrangement,
        preferred_active: Option<&ItemId>,
    ) -> (Self, Option<ItemId>) {
        let known: HashSet<&ItemId> = items.iter().collect();
        let mut seen: HashSet<TileKey> = HashSet::new();
        let mut supplied: Vec<Tile> = Vec::with_capacity(tiles.len());
        for tile in tiles {
            if !known.contains(tile.item()) {
                tracing::debug!(tile = %tile.id, "dropping tile for unknown item");
                continue;
            }
            if !seen.insert(tile.id.clone()) {
                continue;
            }
            supplied.push(tile);
        }
        let supplied = Self::from_tiles(supplied);

        let mut out: Vec<Tile> = Vec::with_capacity(items.len() * 2);
        let mut stack_y = supplied
            .iter()
            .chain(fallback.iter())
            .map(|tile| tile.rect.bottom())
            .max()
            .unwrap_or(0);
        for item in items {
            let key = TileKey::primary(item.clone());
            let rect = supplied
                .rect(&key)
                .filter(GridRect::is_visible)
                .or_else(|| fallback.rect(&key).filter(GridRect::is_visible))
                .unwrap_or_else(|| {
                    let rect = GridRect::new(0, stack_y, GRID_COLUMNS / 3, 4);
                    stack_y = rect.bottom();
                    rect
                });
            out.push(Tile::new(key, rect.clamp_to_columns()));
        }

        let winner = preferred_active
            .filter(|item| {
                supplied
                    .auxiliary_rect(item.as_str())
                    .is_some_and(|rect| rect.is_visible())
            })
            .cloned()
            .or_else(|| {
                items
                    .iter()
                    .find(|item| {
                        supplied
                            .auxiliary_rect(item.as_str())
                            .is_some_and(|rect| rect.is_visible())
                    })
                    .cloned()
            });

        for item in items {
            let rect = if Some(item) == winner.as_ref() {
                supplied
                    .auxiliary_rect(item.as_str())
                    .map_or(GridRect::HIDDEN, GridRect::clamp_to_columns)
            } else {
                GridRect::HIDDEN
            };
            out.push(Tile::auxiliary(item.clone(), rect));
        }

        (Self::from_tiles(out), winner)
    }

    /// Check the arrangement against `items` and the expected active target.
    #[must_use]
    pub fn invariant_report(&self, items: &[ItemId], active: Option<&ItemId>) -> ArrangementReport {
        let mut issues = Vec::new();
        let known: HashSet<&ItemId> = items.iter().collect();

        if self.tiles.len() != items.len() * 2 {
            issues.push(ArrangementIssue::new(
                ArrangementIssueCode::TileCountMismatch,
                None,
                format!(
                    "expected {} tiles for {} items, found {}",
                    items.len() * 2,
                    items.len(),
                    self.tiles.len()
                ),
            ));
        }

        let mut seen: HashSet<&TileKey> = HashSet::new();
        for tile in &self.tiles {
            if !seen.insert(&tile.id) {
                issues.push(ArrangementIssue::new(
                    ArrangementIssueCode::DuplicateTile,
                    Some(tile.id.clone()),
                    format!("tile {} appears more than once", tile.id),
                ));
            }
            if !known.contains(tile.item()) {
                issues.push(ArrangementIssue::new(
                    ArrangementIssueCode::UnknownItem,
                    Some(tile.id.clone()),
                    format!("tile {} references an item not in the list", tile.id),
                ));
            }
            if !tile.rect.fits_columns() {
                issues.push(ArrangementIssue::new(
                    ArrangementIssueCode::OutOfBounds,
                    Some(tile.id.clone()),
                    format!(
                        "tile {} spans columns {}..{} beyond {GRID_COLUMNS}",
                        tile.id,
                        tile.rect.x,
                        tile.rect.right()
                    ),
                ));
            }
            if tile.kind() == TileKind::Primary && tile.rect.is_degenerate() {
                issues.push(ArrangementIssue::new(
                    ArrangementIssueCode::DegeneratePrimary,
                    Some(tile.id.clone()),
                    format!("primary tile {} has no area", tile.id),
                ));
            }
        }

        for item in items {
            let primary = TileKey::primary(item.clone());
            if !seen.contains(&primary) {
                issues.push(ArrangementIssue::new(
                    ArrangementIssueCode::MissingPrimary,
                    Some(primary),
                    format!("item {item} has no primary tile"),
                ));
            }
            let auxiliary = TileKey::auxiliary(item.clone());
            if !seen.contains(&auxiliary) {
                issues.push(ArrangementIssue::new(
                    ArrangementIssueCode::MissingAuxiliary,
                    Some(auxiliary),
                    format!("item {item} has no auxiliary tile"),
                ));
            }
        }

        let visible: Vec<&Tile> = self.auxiliaries().filter(|tile| tile.is_visible()).collect();
        if visible.len() > 1 {
            issues.push(ArrangementIssue::new(
                ArrangementIssueCode::MultipleVisibleAuxiliary,
                Some(visible[1].id.clone()),
                format!("{} auxiliary tiles are visible", visible.len()),
            ));
        }

        let shown = visible.first().map(|tile| tile.item());
        if shown != active {
            issues.push(ArrangementIssue::new(
                ArrangementIssueCode::ActiveMismatch,
                None,
                format!(
                    "active auxiliary is {:?} but the visible auxiliary tile belongs to {:?}",
                    active.map(ItemId::as_str),
                    shown.map(ItemId::as_str)
                ),
            ));
        }
        if let Some(active) = active
            && !known.contains(active)
        {
            issues.push(ArrangementIssue::new(
                ArrangementIssueCode::UnknownItem,
                Some(TileKey::auxiliary(active.clone())),
                format!("active auxiliary {active} is not in the item list"),
            ));
        }

        ArrangementReport { issues }
    }
}

impl<'a> IntoIterator for &'a Arrangement {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

/// Stable code for arrangement invariant findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangementIssueCode {
    TileCountMismatch,
    MissingPrimary,
    MissingAuxiliary,
    DuplicateTile,
    UnknownItem,
    MultipleVisibleAuxiliary,
    ActiveMismatch,
    OutOfBounds,
    DegeneratePrimary,
}

/// One invariant finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangementIssue {
    pub code: ArrangementIssueCode,
    pub tile: Option<TileKey>,
    pub message: String,
}

impl ArrangementIssue {
    fn new(code: ArrangementIssueCode, tile: Option<TileKey>, message: String) -> Self {
        Self {
            code,
            tile,
            message,
        }
    }
}

/// Structured invariant report over an arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArrangementReport {
    pub issues: Vec<ArrangementIssue>,
}

impl ArrangementReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn has(&self, code: ArrangementIssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    /// Distinct codes present, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<ArrangementIssueCode> {
        let mut codes: Vec<_> = self.issues.iter().map(|issue| issue.code).collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bento_core::item_ids;

    fn two_item_arrangement() -> Arrangement {
        Arrangement::from_tiles(vec![
            Tile::primary("a", GridRect::new(0, 0, 9, 12)),
            Tile::primary("b", GridRect::new(9, 0, 3, 4)),
            Tile::auxiliary("a", GridRect::new(9, 4, 3, 8)),
            Tile::hidden_auxiliary("b"),
        ])
    }

    #[test]
    fn lookups() {
        let arr = two_item_arrangement();
        assert_eq!(arr.len(), 4);
        assert_eq!(arr.primary_rect("b"), Some(GridRect::new(9, 0, 3, 4)));
        assert_eq!(arr.auxiliary_rect("b"), Some(GridRect::HIDDEN));
        assert_eq!(arr.active_auxiliary(), Some(&ItemId::new("a")));
        assert_eq!(arr.primaries().count(), 2);
        assert_eq!(arr.auxiliaries().count(), 2);
        assert!(arr.primary_rect("zzz").is_none());
    }

    #[test]
    fn swap_rects_exchanges_geometry_only() {
        let mut arr = two_item_arrangement();
        assert!(arr.swap_rects(&TileKey::primary("a"), &TileKey::primary("b")));
        assert_eq!(arr.primary_rect("a"), Some(GridRect::new(9, 0, 3, 4)));
        assert_eq!(arr.primary_rect("b"), Some(GridRect::new(0, 0, 9, 12)));
        assert_eq!(arr.tiles()[0].id, TileKey::primary("a"));
    }

    #[test]
    fn swap_rects_unknown_key_is_noop() {
        let mut arr = two_item_arrangement();
        let before = arr.clone();
        assert!(!arr.swap_rects(&TileKey::primary("a"), &TileKey::primary("zzz")));
        assert!(!arr.swap_rects(&TileKey::primary("a"), &TileKey::primary("a")));
        assert_eq!(arr, before);
    }

    #[test]
    fn canonicalize_orders_by_kind_then_item() {
        let items = item_ids(["a", "b"]);
        let mut arr = Arrangement::from_tiles(vec![
            Tile::hidden_auxiliary("b"),
            Tile::primary("b", GridRect::new(9, 0, 3, 4)),
            Tile::auxiliary("a", GridRect::new(9, 4, 3, 8)),
            Tile::primary("a", GridRect::new(0, 0, 9, 12)),
        ]);
        arr.canonicalize(&items);
        assert_eq!(arr, two_item_arrangement());
    }

    #[test]
    fn clean_report() {
        let items = item_ids(["a", "b"]);
        let report = two_item_arrangement().invariant_report(&items, Some(&ItemId::new("a")));
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn report_flags_active_mismatch() {
        let items = item_ids(["a", "b"]);
        let report = two_item_arrangement().invariant_report(&items, None);
        assert_eq!(report.codes(), vec![ArrangementIssueCode::ActiveMismatch]);
    }

    #[test]
    fn report_flags_structural_problems() {
        let items = item_ids(["a", "b"]);
        let arr = Arrangement::from_tiles(vec![
            Tile::primary("a", GridRect::new(0, 0, 9, 12)),
            Tile::primary("a", GridRect::new(0, 0, 9, 12)),
            Tile::primary("c", GridRect::new(10, 0, 4, 4)),
            Tile::auxiliary("a", GridRect::new(9, 4, 3, 8)),
            Tile::auxiliary("b", GridRect::new(0, 12, 3, 3)),
        ]);
        let report = arr.invariant_report(&items, Some(&ItemId::new("a")));
        assert!(report.has(ArrangementIssueCode::TileCountMismatch));
        assert!(report.has(ArrangementIssueCode::DuplicateTile));
        assert!(report.has(ArrangementIssueCode::UnknownItem));
        assert!(report.has(ArrangementIssueCode::OutOfBounds));
        assert!(report.has(ArrangementIssueCode::MissingPrimary));
        assert!(report.has(ArrangementIssueCode::MultipleVisibleAuxiliary));
        assert!(!report.has(ArrangementIssueCode::MissingAuxiliary));
    }

    #[test]
    fn normalize_synthesizes_missing_tiles() {
        let items = item_ids(["a", "b"]);
        let fallback = two_item_arrangement();
        let (arr, active) = Arrangement::normalize(
            vec![Tile::primary("a", GridRect::new(0, 0, 6, 6))],
            &items,
            &fallback,
            Some(&ItemId::new("a")),
        );
        assert_eq!(arr.len(), 4);
        assert_eq!(arr.primary_rect("a"), Some(GridRect::new(0, 0, 6, 6)));
        assert_eq!(arr.primary_rect("b"), Some(GridRect::new(9, 0, 3, 4)));
        assert_eq!(arr.auxiliary_rect("a"), Some(GridRect::HIDDEN));
        assert_eq!(active, None);
        assert!(arr.invariant_report(&items, active.as_ref()).is_clean());
    }

    #[test]
    fn normalize_keeps_one_visible_auxiliary() {
        let items = item_ids(["a", "b"]);
        let (arr, active) = Arrangement::normalize(
            vec![
                Tile::auxiliary("a", GridRect::new(9, 4, 3, 8)),
                Tile::auxiliary("b", GridRect::new(0, 12, 3, 3)),
                Tile::primary("a", GridRect::new(0, 0, 9, 12)),
                Tile::primary("b", GridRect::new(9, 0, 3, 4)),
            ],
            &items,
            &Arrangement::empty(),
            Some(&ItemId::new("b")),
        );
        assert_eq!(active, Some(ItemId::new("b")));
        assert_eq!(arr.auxiliary_rect("a"), Some(GridRect::HIDDEN));
        assert_eq!(arr.auxiliary_rect("b"), Some(GridRect::new(0, 12, 3, 3)));
        assert!(arr.invariant_report(&items, active.as_ref()).is_clean());
    }

    #[test]
    fn normalize_stacks_primaries_without_any_geometry() {
        let items = item_ids(["a", "b"]);
        let (arr, _) = Arrangement::normalize(
            vec![Tile::primary("a", GridRect::new(0, 0, 12, 3))],
            &items,
            &Arrangement::empty(),
            None,
        );
        assert_eq!(arr.primary_rect("b"), Some(GridRect::new(0, 3, 4, 4)));
    }

    #[test]
    fn normalize_clamps_and_drops_unknown() {
        let items = item_ids(["a"]);
        let (arr, _) = Arrangement::normalize(
            vec![
                Tile::primary("a", GridRect::new(8, 0, 9, 8)),
                Tile::primary("ghost", GridRect::new(0, 0, 1, 1)),
            ],
            &items,
            &Arrangement::empty(),
            None,
        );
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.primary_rect("a"), Some(GridRect::new(8, 0, 4, 8)));
    }
}

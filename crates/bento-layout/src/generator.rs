//! Default arrangement generator.
//!
//! Small item counts (1 through 6) use hand-tuned presets that give the
//! first item the largest tile and reserve a column for the visible
//! auxiliary tile. Larger counts fall back to a square-ish row-major grid.
//!
//! Generation is pure: the same inputs always produce the same arrangement.

use bento_core::{GRID_COLUMNS, GridRect, ItemId, Tile};

use crate::arrangement::Arrangement;

/// Row height of tiles in the generic grid.
pub const GENERIC_TILE_HEIGHT: u16 = 5;

/// Size of the auxiliary tile in the generic grid.
pub const GENERIC_AUXILIARY_SIZE: u16 = 4;

/// Where an auxiliary tile goes when shown outside a generated preset.
pub const DEFAULT_AUXILIARY_SLOT: GridRect = GridRect::new(9, 0, 3, 8);

/// Largest item count with a hand-tuned preset.
pub const MAX_PRESET_ITEMS: usize = 6;

/// A preset: primary rects in item order plus the visible auxiliary rect.
struct Preset {
    primaries: &'static [GridRect],
    auxiliary: GridRect,
}

const fn r(x: u16, y: u16, w: u16, h: u16) -> GridRect {
    GridRect::new(x, y, w, h)
}

const PRESETS: [Preset; MAX_PRESET_ITEMS] = [
    Preset {
        primaries: &[r(0, 0, 9, 8)],
        auxiliary: r(9, 0, 3, 8),
    },
    Preset {
        primaries: &[r(0, 0, 9, 12), r(9, 0, 3, 4)],
        auxiliary: r(9, 4, 3, 8),
    },
    Preset {
        primaries: &[r(0, 0, 8, 8), r(0, 8, 4, 4), r(4, 8, 4, 4)],
        auxiliary: r(8, 0, 4, 12),
    },
    Preset {
        primaries: &[r(0, 0, 9, 8), r(0, 8, 3, 4), r(3, 8, 3, 4), r(6, 8, 3, 4)],
        auxiliary: r(9, 0, 3, 12),
    },
    Preset {
        primaries: &[
            r(0, 0, 9, 8),
            r(0, 8, 3, 4),
            r(3, 8, 3, 4),
            r(6, 8, 3, 4),
            r(9, 0, 3, 4),
        ],
        auxiliary: r(9, 4, 3, 8),
    },
    Preset {
        primaries: &[
            r(0, 0, 6, 8),
            r(0, 8, 3, 4),
            r(3, 8, 3, 4),
            r(6, 8, 3, 4),
            r(6, 0, 3, 4),
            r(6, 4, 3, 4),
        ],
        auxiliary: r(9, 0, 3, 12),
    },
];

/// Primary rects and the auxiliary rect for `count` items.
///
/// `count` must be at least one.
fn geometry_for(count: usize) -> (Vec<GridRect>, GridRect) {
    debug_assert!(count > 0);
    if let Some(preset) = PRESETS.get(count.wrapping_sub(1)) {
        return (preset.primaries.to_vec(), preset.auxiliary);
    }

    // At most one column per grid cell; past that, rows grow instead.
    let cols = ceil_sqrt(count).min(usize::from(GRID_COLUMNS));
    let tile_w = GRID_COLUMNS / cols as u16;
    let primaries = (0..count)
        .map(|index| {
            let row = (index / cols) as u16;
            let col = (index % cols) as u16;
            GridRect::new(
                col * tile_w,
                row * GENERIC_TILE_HEIGHT,
                tile_w,
                GENERIC_TILE_HEIGHT,
            )
        })
        .collect();
    let rows = count.div_ceil(cols) as u16;
    let auxiliary = GridRect::new(
        GRID_COLUMNS - GENERIC_AUXILIARY_SIZE,
        rows * GENERIC_TILE_HEIGHT,
        GENERIC_AUXILIARY_SIZE,
        GENERIC_AUXILIARY_SIZE,
    );
    (primaries, auxiliary)
}

/// Smallest `c` with `c * c >= n`.
fn ceil_sqrt(n: usize) -> usize {
    let mut c = (n as f64).sqrt() as usize;
    while c * c < n {
        c += 1;
    }
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c
}

/// Resolve which item the visible auxiliary tile binds to.
///
/// A requested item that is in `items` wins; anything else falls back to the
/// first item.
#[must_use]
pub fn resolve_auxiliary<'a>(items: &'a [ItemId], requested: Option<&ItemId>) -> Option<&'a ItemId> {
    requested
        .and_then(|want| items.iter().find(|item| *item == want))
        .or_else(|| items.first())
}

/// Generate the default arrangement for `items`.
///
/// The visible auxiliary tile goes to `active` when it names a current item,
/// else to the first item. Every other item gets a hidden auxiliary tile.
/// Returns an empty arrangement for an empty list.
#[must_use]
pub fn generate(items: &[ItemId], active: Option<&ItemId>) -> Arrangement {
    let Some(active) = resolve_auxiliary(items, active) else {
        return Arrangement::empty();
    };

    let (primaries, auxiliary) = geometry_for(items.len());
    let mut tiles: Vec<Tile> = Vec::with_capacity(items.len() * 2);
    tiles.extend(
        items
            .iter()
            .zip(primaries)
            .map(|(item, rect)| Tile::primary(item.clone(), rect)),
    );
    tiles.extend(items.iter().map(|item| {
        if item == active {
            Tile::auxiliary(item.clone(), auxiliary)
        } else {
            Tile::hidden_auxiliary(item.clone())
        }
    }));
    Arrangement::from_tiles(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bento_core::item_ids;

    #[test]
    fn ceil_sqrt_values() {
        let cases = [(1, 1), (2, 2), (4, 2), (5, 3), (7, 3), (9, 3), (10, 4), (16, 4), (17, 5)];
        for (n, want) in cases {
            assert_eq!(ceil_sqrt(n), want, "n={n}");
        }
    }

    #[test]
    fn empty_items_empty_arrangement() {
        assert!(generate(&[], None).is_empty());
    }

    #[test]
    fn single_item() {
        let items = item_ids(["s1"]);
        let arr = generate(&items, Some(&ItemId::new("s1")));
        assert_eq!(
            arr.tiles(),
            &[
                Tile::primary("s1", GridRect::new(0, 0, 9, 8)),
                Tile::auxiliary("s1", GridRect::new(9, 0, 3, 8)),
            ]
        );
    }

    #[test]
    fn presets_fit_the_grid_without_overlap() {
        for n in 1..=MAX_PRESET_ITEMS {
            let items: Vec<ItemId> = (0..n).map(|i| ItemId::new(format!("s{i}"))).collect();
            let arr = generate(&items, None);
            let visible: Vec<GridRect> = arr
                .iter()
                .filter(|tile| tile.is_visible())
                .map(|tile| tile.rect)
                .collect();
            assert_eq!(visible.len(), n + 1, "n={n}");
            for (i, a) in visible.iter().enumerate() {
                assert!(a.fits_columns(), "n={n} rect={a:?}");
                for b in &visible[i + 1..] {
                    assert!(!a.intersects(b), "n={n} {a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn first_item_gets_largest_primary_in_presets() {
        for n in 2..=MAX_PRESET_ITEMS {
            let items: Vec<ItemId> = (0..n).map(|i| ItemId::new(format!("s{i}"))).collect();
            let arr = generate(&items, None);
            let first = arr.primary_rect("s0").unwrap().area();
            assert!(arr.primaries().skip(1).all(|tile| tile.rect.area() < first), "n={n}");
        }
    }

    #[test]
    fn stale_active_falls_back_to_first_item() {
        let items = item_ids(["a", "b"]);
        let arr = generate(&items, Some(&ItemId::new("gone")));
        assert_eq!(arr.active_auxiliary(), Some(&ItemId::new("a")));
        let arr = generate(&items, Some(&ItemId::new("b")));
        assert_eq!(arr.active_auxiliary(), Some(&ItemId::new("b")));
        assert_eq!(arr.auxiliary_rect("b"), Some(GridRect::new(9, 4, 3, 8)));
        assert_eq!(arr.auxiliary_rect("a"), Some(GridRect::HIDDEN));
    }

    #[test]
    fn generic_grid_for_seven_items() {
        let items: Vec<ItemId> = (0..7).map(|i| ItemId::new(format!("s{i}"))).collect();
        let arr = generate(&items, None);
        assert_eq!(arr.len(), 14);
        // cols = 3, tile width = 4
        assert_eq!(arr.primary_rect("s0"), Some(GridRect::new(0, 0, 4, 5)));
        assert_eq!(arr.primary_rect("s2"), Some(GridRect::new(8, 0, 4, 5)));
        assert_eq!(arr.primary_rect("s3"), Some(GridRect::new(0, 5, 4, 5)));
        assert_eq!(arr.primary_rect("s6"), Some(GridRect::new(0, 10, 4, 5)));
        assert_eq!(arr.auxiliary_rect("s0"), Some(GridRect::new(8, 15, 4, 4)));
    }

    #[test]
    fn generic_grid_caps_columns_at_grid_width() {
        let items: Vec<ItemId> = (0..145).map(|i| ItemId::new(format!("s{i}"))).collect();
        let arr = generate(&items, None);
        assert_eq!(arr.primary_rect("s0"), Some(GridRect::new(0, 0, 1, 5)));
        assert_eq!(arr.primary_rect("s11"), Some(GridRect::new(11, 0, 1, 5)));
        assert_eq!(arr.primary_rect("s12"), Some(GridRect::new(0, 5, 1, 5)));
        assert_eq!(arr.primary_rect("s144"), Some(GridRect::new(0, 60, 1, 5)));
        // 13 rows of tiles
        assert_eq!(arr.auxiliary_rect("s0"), Some(GridRect::new(8, 65, 4, 4)));
        let report = arr.invariant_report(&items, Some(&ItemId::new("s0")));
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn generic_grid_for_ten_items_uses_three_wide_tiles() {
        let items: Vec<ItemId> = (0..10).map(|i| ItemId::new(format!("s{i}"))).collect();
        let arr = generate(&items, None);
        assert_eq!(arr.primary_rect("s3"), Some(GridRect::new(9, 0, 3, 5)));
        assert_eq!(arr.primary_rect("s9"), Some(GridRect::new(3, 10, 3, 5)));
        assert_eq!(arr.auxiliary_rect("s0"), Some(GridRect::new(8, 15, 4, 4)));
    }
}

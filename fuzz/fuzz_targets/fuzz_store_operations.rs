#![no_main]

use arbitrary::Arbitrary;
use bento_core::{GridRect, Tile, TileKey, TileKind};
use bento_layout::{LayoutStore, MemoryStorage};
use libfuzzer_sys::fuzz_target;

const POOL: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

#[derive(Debug, Arbitrary)]
enum Op {
    SetItems(Vec<u8>),
    SwapByName(u8, u8),
    SwapByIndex(u8, u8),
    SwapOrder(u8, u8),
    MoveTo(u8, u8),
    SetActive(u8),
    ClearActive,
    AddAuxiliary(u8),
    RemoveAuxiliary(u8),
    ExternalEdit(Vec<(u8, bool, u8, u8, u8, u8)>),
    ResetForCount(u8),
    Save,
}

fn name(index: u8) -> &'static str {
    // One slot past the pool names an unknown item.
    POOL.get(usize::from(index) % (POOL.len() + 1)).copied().unwrap_or("ghost")
}

fuzz_target!(|ops: Vec<Op>| {
    let mut store = LayoutStore::new(MemoryStorage::with_quota(4096));
    for op in ops.into_iter().take(256) {
        match op {
            Op::SetItems(picks) => {
                store.set_items(picks.iter().take(POOL.len()).map(|&p| name(p)));
            }
            Op::SwapByName(a, b) => {
                store.swap_by_name(name(a), name(b));
            }
            Op::SwapByIndex(i, j) => {
                store.swap_by_index(usize::from(i), usize::from(j));
            }
            Op::MoveTo(item, index) => {
                store.move_item_to_position(name(item), usize::from(index));
            }
            Op::SwapOrder(a, b) => {
                store.swap_order_by_name(name(a), name(b));
            }
            Op::SetActive(target) => {
                store.set_active_auxiliary(name(target));
            }
            Op::ClearActive => {
                store.clear_active_auxiliary();
            }
            Op::AddAuxiliary(target) => {
                store.add_auxiliary(name(target));
            }
            Op::RemoveAuxiliary(target) => {
                store.remove_auxiliary(name(target));
            }
            Op::ExternalEdit(raw) => {
                let tiles = raw
                    .into_iter()
                    .map(|(item, auxiliary, x, y, w, h)| {
                        let kind = if auxiliary {
                            TileKind::Auxiliary
                        } else {
                            TileKind::Primary
                        };
                        Tile::new(
                            TileKey::new(kind, name(item)),
                            GridRect::new(x.into(), y.into(), w.into(), h.into()),
                        )
                    })
                    .collect();
                store.commit_external_layout_edit(tiles);
            }
            Op::ResetForCount(count) => {
                store.reset_for_count(usize::from(count % 10));
            }
            Op::Save => {
                store.save_to_storage();
            }
        }

        assert_eq!(store.tiles().len(), store.items().len() * 2, "tile count");
        let report = store.invariant_report();
        assert!(report.is_clean(), "invariants violated: {report:?}");
    }
});

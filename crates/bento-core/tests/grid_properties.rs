//! Property tests for grid rects and tile keys.

use bento_core::{GRID_COLUMNS, GridRect, ItemId, Tile, TileKey, TileKind};
use proptest::prelude::*;

fn any_rect() -> impl Strategy<Value = GridRect> {
    (0u16..40, 0u16..40, 0u16..40, 0u16..40).prop_map(GridRect::from)
}

fn item_name() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_-]{0,15}"
}

proptest! {
    #[test]
    fn clamp_always_fits_columns(rect in any_rect()) {
        let clamped = rect.clamp_to_columns();
        prop_assert!(clamped.fits_columns());
        prop_assert!(clamped.right() <= GRID_COLUMNS);
        prop_assert_eq!(clamped.y, rect.y);
        prop_assert_eq!(clamped.h, rect.h);
    }

    #[test]
    fn clamp_is_identity_when_fitting(rect in any_rect()) {
        prop_assume!(rect.fits_columns() && rect.w > 0);
        prop_assert_eq!(rect.clamp_to_columns(), rect);
    }

    #[test]
    fn intersects_is_symmetric(a in any_rect(), b in any_rect()) {
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn hidden_never_intersects(a in any_rect()) {
        prop_assert!(!GridRect::HIDDEN.intersects(&a));
    }

    #[test]
    fn reading_order_is_antisymmetric(a in any_rect(), b in any_rect()) {
        prop_assert_eq!(a.reading_order(&b), b.reading_order(&a).reverse());
    }

    #[test]
    fn tile_key_parses_its_display(name in item_name(), auxiliary in any::<bool>()) {
        let kind = if auxiliary { TileKind::Auxiliary } else { TileKind::Primary };
        let key = TileKey::new(kind, name.as_str());
        let parsed: TileKey = key.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, &key);
        prop_assert_eq!(parsed.item.as_str(), name.as_str());
    }

    #[test]
    fn tile_json_keeps_flat_shape(name in item_name(), rect in any_rect()) {
        let tile = Tile::primary(ItemId::new(name.clone()), rect);
        let value = serde_json::to_value(&tile).unwrap();
        let expected_id = format!("primary-{name}");
        prop_assert_eq!(value["id"].as_str(), Some(expected_id.as_str()));
        prop_assert_eq!(value["w"].as_u64(), Some(u64::from(rect.w)));
        let back: Tile = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back, tile);
    }
}

#[test]
fn dashed_item_ids_split_on_first_separator() {
    let key: TileKey = "auxiliary-my-stream-1".parse().unwrap();
    assert_eq!(key.kind, TileKind::Auxiliary);
    assert_eq!(key.item, "my-stream-1");
}

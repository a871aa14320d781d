//! Directory-backed storage and cross-session layout persistence.

use bento_core::{GridRect, ItemId};
use bento_layout::{
    FileStorage, LayoutStore, Reconciliation, StorageBackend, StorageError, StoreConfig,
};

#[test]
fn set_get_remove_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();

    assert!(storage.get("bentostream-layout-1").unwrap().is_none());
    storage.set("bentostream-layout-1", "{\"v\":1}").unwrap();
    assert_eq!(
        storage.get("bentostream-layout-1").unwrap().as_deref(),
        Some("{\"v\":1}")
    );
    assert!(dir.path().join("bentostream-layout-1.json").exists());

    storage.remove("bentostream-layout-1").unwrap();
    storage.remove("bentostream-layout-1").unwrap();
    assert!(storage.get("bentostream-layout-1").unwrap().is_none());
}

#[test]
fn keys_lists_only_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("b", "1").unwrap();
    storage.set("a", "2").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    assert_eq!(storage.keys().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(storage.name(), "file");
}

#[test]
fn rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    for key in ["", ".", "../escape", "a/b", "a\\b", "x..y"] {
        assert!(
            matches!(storage.set(key, "v"), Err(StorageError::InvalidKey(_))),
            "key {key:?}"
        );
    }
}

#[test]
fn open_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state").join("layouts");
    let storage = FileStorage::open(&nested).unwrap();
    assert_eq!(storage.dir(), nested.as_path());
    assert!(nested.is_dir());
}

#[test]
fn layouts_survive_a_new_session() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store = LayoutStore::new(FileStorage::open(dir.path()).unwrap());
        store.set_items(["a", "b"]);
        assert!(store.swap_by_name("a", "b"));
        assert!(store.set_active_auxiliary("b"));
    }

    let mut store = LayoutStore::new(FileStorage::open(dir.path()).unwrap());
    store.set_items(["a"]);
    assert_eq!(store.set_items(["a", "b"]), Reconciliation::Loaded);
    assert_eq!(store.arrangement().primary_rect("a"), Some(GridRect::new(9, 0, 3, 4)));
    assert_eq!(store.arrangement().primary_rect("b"), Some(GridRect::new(0, 0, 9, 12)));
    // The saved auxiliary slot binds to the carried-over active item.
    assert_eq!(store.active_auxiliary(), Some(&ItemId::new("a")));
    assert_eq!(store.arrangement().auxiliary_rect("a"), Some(GridRect::new(9, 4, 3, 8)));
}

#[test]
fn custom_prefix_isolates_layouts() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        key_prefix: "wall".into(),
        ..StoreConfig::default()
    };
    let mut store = LayoutStore::with_config(FileStorage::open(dir.path()).unwrap(), &config);
    store.set_items(["a"]);
    assert!(store.save_to_storage());
    assert!(dir.path().join("wall-1.json").exists());
    assert_eq!(store.clear_all_layouts(), 1);
    assert!(!dir.path().join("wall-1.json").exists());
}

#![no_main]

use bento_core::ItemId;
use bento_layout::{LayoutCodec, MemoryStorage, StorageBackend};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the item count (1..=12), second the requested active.
    if data.len() < 2 {
        return;
    }
    let count = usize::from(data[0] % 12) + 1;
    let requested = usize::from(data[1]) % (count + 1);
    let Ok(raw) = std::str::from_utf8(&data[2..]) else {
        return;
    };

    let items: Vec<ItemId> = (0..count).map(|i| ItemId::new(format!("s{i}"))).collect();
    let codec = LayoutCodec::new(MemoryStorage::new());
    let key = codec.key_for(count);
    if codec.storage().set(&key, raw).is_err() {
        return;
    }

    // Decoding arbitrary records must never panic, and anything accepted
    // must satisfy the arrangement invariants.
    if let Some(loaded) = codec.load(count, &items, items.get(requested)) {
        assert_eq!(loaded.arrangement.len(), count * 2, "tile count");
        let report = loaded
            .arrangement
            .invariant_report(&items, loaded.active.as_ref());
        assert!(report.is_clean(), "accepted record violates invariants: {report:?}");

        // Re-saving an accepted record and loading it again is stable.
        codec
            .save(&loaded.arrangement, &items)
            .expect("memory storage accepts writes");
        let again = codec
            .load(count, &items, loaded.active.as_ref())
            .expect("re-saved record loads");
        assert_eq!(again.arrangement, loaded.arrangement, "re-save changed geometry");
    }
});

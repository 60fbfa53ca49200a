use triagedesk::core::{
    hashing::{bucket, djb2, probe},
    index::{IndexError, KeyedIndex, SlotState},
};

fn zero_hash(_: &[u8]) -> u32 {
    0
}

#[test]
fn djb2_matches_reference_values() {
    assert_eq!(djb2(b""), 5381);
    assert_eq!(djb2(b"a"), 5381 * 33 + 97);
    assert_eq!(djb2(b"ab"), (5381 * 33 + 97) * 33 + 98);
    // Long keys wrap instead of overflowing.
    let long = "x".repeat(64);
    assert_eq!(djb2(long.as_bytes()), djb2(long.as_bytes()));
}

#[test]
fn bucket_and_probe_wrap_modulo_capacity() {
    assert_eq!(bucket(12, 5), 2);
    assert_eq!(probe(3, 0, 5), 3);
    assert_eq!(probe(3, 2, 5), 0);
    assert_eq!(probe(u32::MAX, 1, 7), ((u64::from(u32::MAX) + 1) % 7) as usize);
}

#[test]
fn set_then_get_returns_value() {
    let mut index = KeyedIndex::with_capacity(101);
    assert_eq!(index.set("P-1", "fever".to_string()), Ok(None));
    assert_eq!(index.get("P-1").map(String::as_str), Some("fever"));
    assert_eq!(index.len(), 1);
}

#[test]
fn set_existing_key_updates_in_place() {
    let mut index = KeyedIndex::with_capacity(11);
    index.set("P-1", 1).unwrap();
    let slot = index.slot_of("P-1");

    assert_eq!(index.set("P-1", 2), Ok(Some(1)));
    assert_eq!(index.get("P-1"), Some(&2));
    assert_eq!(index.len(), 1);
    assert_eq!(index.slot_of("P-1"), slot);
}

#[test]
fn get_missing_key_traverses_occupied_chain() {
    let mut index = KeyedIndex::with_hasher(8, zero_hash);
    for key in ["a", "b", "c", "d"] {
        index.set(key, key.len()).unwrap();
    }
    assert_eq!(index.get("zzz"), None);
    assert!(!index.contains_key("zzz"));
}

#[test]
fn colliding_keys_fill_consecutive_slots_until_full() {
    let mut index = KeyedIndex::with_hasher(5, zero_hash);
    for (i, key) in ["A", "B", "C", "D", "E"].into_iter().enumerate() {
        index.set(key, i).unwrap();
        assert_eq!(index.slot_of(key), Some(i));
    }
    for (i, key) in ["A", "B", "C", "D", "E"].into_iter().enumerate() {
        assert_eq!(index.get(key), Some(&i));
    }

    assert_eq!(index.set("F", 5), Err(IndexError::Full { capacity: 5 }));
    assert_eq!(index.len(), 5);
    // A full table still finds every key and reports misses.
    assert_eq!(index.get("E"), Some(&4));
    assert_eq!(index.get("F"), None);
}

#[test]
fn tombstone_keeps_probe_chain_intact() {
    let mut index = KeyedIndex::with_hasher(5, zero_hash);
    index.set("k", "first").unwrap();
    index.set("other", "second").unwrap();

    assert_eq!(index.remove("k"), Some("first"));
    assert_eq!(index.state_at(0), Some(SlotState::Tombstoned));
    assert_eq!(index.get("k"), None);
    assert_eq!(index.get("other"), Some(&"second"));
    assert_eq!((index.len(), index.tombstones()), (1, 1));
}

#[test]
fn insert_reuses_first_tombstone() {
    let mut index = KeyedIndex::with_hasher(5, zero_hash);
    index.set("a", 1).unwrap();
    index.set("b", 2).unwrap();
    index.set("c", 3).unwrap();
    index.remove("a").unwrap();

    index.set("d", 4).unwrap();
    assert_eq!(index.slot_of("d"), Some(0));
    assert_eq!(index.tombstones(), 0);
    assert_eq!(index.state_at(3), Some(SlotState::Empty));
}

#[test]
fn update_behind_tombstone_does_not_duplicate() {
    let mut index = KeyedIndex::with_hasher(5, zero_hash);
    index.set("a", 1).unwrap();
    index.set("b", 2).unwrap();
    index.remove("a").unwrap();

    assert_eq!(index.set("b", 20), Ok(Some(2)));
    assert_eq!(index.slot_of("b"), Some(1));
    assert_eq!(index.state_at(0), Some(SlotState::Tombstoned));
    assert_eq!(index.len(), 1);
}

#[test]
fn full_table_of_tombstones_accepts_inserts() {
    let mut index = KeyedIndex::with_hasher(3, zero_hash);
    for key in ["a", "b", "c"] {
        index.set(key, ()).unwrap();
    }
    for key in ["a", "b", "c"] {
        index.remove(key).unwrap();
    }
    assert_eq!(index.get("a"), None);
    index.set("d", ()).unwrap();
    assert_eq!(index.slot_of("d"), Some(0));
}

#[test]
fn remove_missing_key_is_noop() {
    let mut index: KeyedIndex<u8> = KeyedIndex::with_capacity(7);
    assert_eq!(index.remove("nobody"), None);
    assert_eq!(index.tombstones(), 0);
}

#[test]
fn zero_capacity_table_is_always_full() {
    let mut index = KeyedIndex::with_capacity(0);
    assert_eq!(index.set("a", 1), Err(IndexError::Full { capacity: 0 }));
    assert_eq!(index.get("a"), None);
}

#[test]
fn iter_yields_live_pairs_only() {
    let mut index = KeyedIndex::with_capacity(13);
    index.set("a", 1).unwrap();
    index.set("b", 2).unwrap();
    index.set("c", 3).unwrap();
    index.remove("b").unwrap();

    let mut pairs: Vec<(String, i32)> = index.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    pairs.sort();
    assert_eq!(pairs, vec![("a".to_string(), 1), ("c".to_string(), 3)]);
}

use lazy_shardmap::{Error, ShardMap, ShardMapBuilder};
use std::sync::Arc;

#[test]
fn test_basic_insert_get() {
    let map = ShardMap::new();

    assert!(map.insert("key1", "value1").is_none());
    assert_eq!(*map.get(&"key1").unwrap(), "value1");

    // Overwrite
    assert_eq!(*map.insert("key1", "value2").unwrap(), "value1");
    assert_eq!(*map.get(&"key1").unwrap(), "value2");
}

#[test]
fn test_remove() {
    let map = ShardMap::new();

    map.insert("key1", "value1");
    assert_eq!(*map.remove(&"key1").unwrap(), "value1");
    assert!(map.get(&"key1").is_none());
    assert!(map.remove(&"key1").is_none());
}

#[test]
fn test_string_keys_borrowed_lookup() {
    let map: ShardMap<String, String> = ShardMap::new();

    map.insert("hello".to_string(), "world".to_string());
    assert_eq!(map.get("hello").unwrap().as_str(), "world");
    assert!(map.contains_key("hello"));
    assert!(!map.contains_key("world"));
    assert_eq!(map.remove("hello").unwrap().as_str(), "world");
}

#[test]
fn test_empty_map_with_and_without_capacity() {
    for map in [ShardMap::<String, u32>::new(), ShardMap::with_capacity(4096)] {
        assert!(map.get("999").is_none());
        assert!(map.remove("999").is_none());
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
    }
}

#[test]
fn test_len_and_is_empty() {
    let map = ShardMap::new();

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);

    map.insert("key1", "value1");
    assert!(!map.is_empty());
    assert_eq!(map.len(), 1);

    map.insert("key2", "value2");
    assert_eq!(map.len(), 2);

    map.remove(&"key1");
    assert_eq!(map.len(), 1);
}

#[test]
fn test_len_tracks_inserts_and_removes() {
    let map: ShardMap<String, usize> = ShardMap::with_capacity(500);

    for i in 0..500 {
        assert!(map.insert(i.to_string(), i).is_none());
    }
    assert_eq!(map.len(), 500);

    for i in 0..200 {
        assert_eq!(*map.remove(i.to_string().as_str()).unwrap(), i);
    }
    assert_eq!(map.len(), 300);
}

#[test]
fn test_clear() {
    let map: ShardMap<String, usize> = ShardMap::new();
    for i in 0..1000 {
        map.insert(i.to_string(), i);
    }
    assert_eq!(map.len(), 1000);
    let shard_count = map.shard_count();

    map.clear();
    assert_eq!(map.len(), 0);
    for i in 0..1000 {
        assert!(map.get(i.to_string().as_str()).is_none());
    }
    assert_eq!(map.shard_count(), shard_count);

    // Still usable afterwards.
    map.insert("again".to_string(), 1);
    assert_eq!(map.len(), 1);
}

#[test]
fn test_range_visits_everything() {
    let map: ShardMap<String, usize> = ShardMap::new();
    for i in 0..100 {
        map.insert(i.to_string(), i + 1);
    }

    let mut visited = 0;
    map.range(|key, value| {
        assert_eq!(key.parse::<usize>().unwrap() + 1, *value);
        visited += 1;
        true
    });
    assert_eq!(visited, 100);
}

#[test]
fn test_range_stops_after_first_entry() {
    let map: ShardMap<String, usize> = ShardMap::new();
    for i in 0..100 {
        map.insert(i.to_string(), i);
    }

    let mut visited = 0;
    map.range(|_, _| {
        visited += 1;
        false
    });
    assert_eq!(visited, 1);

    // Reads still work, so no shard lock leaked.
    assert!(map.get("0").is_some());
    map.insert("0".to_string(), 0);
}

#[test]
fn test_range_on_empty_map() {
    let map: ShardMap<String, usize> = ShardMap::new();
    let mut visited = 0;
    map.range(|_, _| {
        visited += 1;
        true
    });
    assert_eq!(visited, 0);
}

#[test]
fn test_stats() {
    let map = ShardMap::new();

    map.insert("key1", "value1");
    map.insert("key2", "value2");
    map.get(&"key1");
    map.get(&"key2");
    map.remove(&"key1");

    let stats = map.stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.shard_sizes.len(), map.shard_count());
    assert_eq!(stats.operations.len(), map.shard_count());

    #[cfg(feature = "metrics")]
    {
        let total_ops: u64 = stats.operations.iter().map(|op| op.total()).sum();
        assert_eq!(total_ops, 5);
    }
}

#[test]
fn test_iter_snapshot() {
    let map = ShardMap::new();

    map.insert("key1", "value1");
    map.insert("key2", "value2");
    map.insert("key3", "value3");

    let snapshot = map.iter_snapshot();
    assert_eq!(snapshot.len(), 3);

    let mut entries: Vec<_> = snapshot.collect();
    entries.sort_by_key(|(k, _)| *k);

    assert_eq!(entries[0].0, "key1");
    assert_eq!(entries[1].0, "key2");
    assert_eq!(entries[2].0, "key3");

    // Snapshot holds no locks.
    map.insert("key4", "value4");
    assert_eq!(map.len(), 4);
}

#[test]
fn test_builder() {
    let map = ShardMapBuilder::new()
        .shard_count(8)
        .unwrap()
        .capacity(64)
        .build::<String, i32>()
        .unwrap();

    map.insert("test".to_string(), 42);
    assert_eq!(*map.get("test").unwrap(), 42);
    assert_eq!(map.shard_count(), 8);
}

#[test]
fn test_builder_invalid_shard_count() {
    // Not a power of two
    assert_eq!(
        ShardMapBuilder::new().shard_count(7).unwrap_err(),
        Error::InvalidShardCount(7)
    );

    // Zero
    assert!(ShardMapBuilder::new().shard_count(0).is_err());
}

#[test]
fn test_default_map() {
    let map: ShardMap<String, i32> = ShardMap::default();
    assert!(map.is_empty());
    assert!(map.shard_count().is_power_of_two());
}

#[test]
fn test_arc_sharing() {
    let map = ShardMap::new();

    map.insert("key", "value");
    let arc1 = map.get(&"key").unwrap();
    let arc2 = map.get(&"key").unwrap();

    // Both should point to the same value
    assert!(Arc::ptr_eq(&arc1, &arc2));
    assert_eq!(*arc1, *arc2);
}

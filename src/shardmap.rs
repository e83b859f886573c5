use crate::config::{create_hasher, Config};
use crate::error::Error;
use crate::hash::ShardHasher;
use crate::iter::SnapshotIter;
use crate::shard::Shard;
use crate::stats::{ShardOps, Stats};
use crate::store::ShardStore;
use hashbrown::HashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

/// Store used by [`ShardMap`] unless another one is chosen.
pub type DefaultStore<K, V> = HashMap<K, Arc<V>>;

/// The shard array, fixed once built.
struct Shards<K, V, S> {
    slots: Box<[Shard<K, V, S>]>,
    mask: usize,
    capacity_per_shard: usize,
}

/// Concurrent map split into independently locked shards.
///
/// Every key is routed to exactly one shard by its hash, so operations on
/// different shards never wait on each other. Values are stored behind
/// `Arc<V>` and handed out without copying.
///
/// Shards are not allocated until the first operation. At that point the
/// shard count is fixed (the smallest power of two that is at least
/// 16 × available CPUs, unless pinned on the builder) and never changes.
///
/// # Reentrancy
///
/// [`insert_accept`](Self::insert_accept), [`remove_accept`](Self::remove_accept)
/// and [`range`](Self::range) run caller code while a shard lock is held.
/// Any call from that code back into the same map that touches the locked
/// shard may deadlock. Whole-map calls such as [`len`](Self::len) and
/// [`clear`](Self::clear) touch every shard.
///
/// # Example
///
/// ```rust
/// use lazy_shardmap::ShardMap;
///
/// let map = ShardMap::new();
/// map.insert("key1", "value1");
///
/// if let Some(value) = map.get(&"key1") {
///     println!("Found: {}", *value);
/// }
/// ```
pub struct ShardMap<K, V, S = DefaultStore<K, V>> {
    config: Config,
    hash: ShardHasher,
    shards: OnceLock<Shards<K, V, S>>,
}

impl<K, V> ShardMap<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty map with no capacity hint.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty map sized for roughly `capacity` entries in total.
    ///
    /// Nothing is allocated until the first operation.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(Config::new().capacity(capacity))
    }
}

impl<K, V, S> ShardMap<K, V, S>
where
    K: Hash + Eq,
    S: ShardStore<K, Arc<V>>,
{
    /// Create a new map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: Config) -> Self {
        Self {
            hash: create_hasher(config.hash_function),
            config,
            shards: OnceLock::new(),
        }
    }

    /// The shard array, built on first call. Racing callers block until the
    /// winner has finished.
    fn shards(&self) -> &Shards<K, V, S> {
        self.shards.get_or_init(|| {
            let count = self.config.resolve_shard_count();
            let capacity_per_shard = self.config.capacity / count;
            tracing::debug!(
                shard_count = count,
                capacity_per_shard,
                "initializing shards"
            );

            Shards {
                slots: (0..count).map(|_| Shard::new(capacity_per_shard)).collect(),
                mask: count - 1,
                capacity_per_shard,
            }
        })
    }

    #[inline]
    fn index_in<Q>(&self, shards: &Shards<K, V, S>, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hash.hash_key(key) as usize) & shards.mask
    }

    #[inline]
    fn shard_for<Q>(&self, key: &Q) -> &Shard<K, V, S>
    where
        Q: Hash + ?Sized,
    {
        let shards = self.shards();
        &shards.slots[self.index_in(shards, key)]
    }

    /// Index of the shard `key` is routed to.
    pub fn shard_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.index_in(self.shards(), key)
    }

    /// Number of shards. Fixed for the life of the map.
    pub fn shard_count(&self) -> usize {
        self.shards().slots.len()
    }

    /// Insert a key-value pair. Returns the old value if the key existed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazy_shardmap::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// assert!(map.insert("key", "value").is_none());
    /// assert_eq!(map.insert("key", "new_value").unwrap().as_ref(), &"value");
    /// ```
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        self.shard_for(&key).insert(key, value)
    }

    /// Get a value by key. Returns an `Arc<V>` so you can share it without copying.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazy_shardmap::ShardMap;
    ///
    /// let map: ShardMap<String, u32> = ShardMap::new();
    /// map.insert("key".to_string(), 7);
    ///
    /// assert_eq!(*map.get("key").unwrap(), 7);
    /// assert!(map.get("missing").is_none());
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).get(key)
    }

    /// Check whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).contains_key(key)
    }

    /// Remove a key-value pair, returning the value if it existed.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).remove(key)
    }

    /// Insert a value, letting `accept` inspect the previous value and veto
    /// the write.
    ///
    /// The shard's exclusive lock is held from the tentative write until
    /// `accept` returns, so no other thread sees the tentative state. If
    /// `accept` returns `true` the write stands and the previous value is
    /// returned. If it returns `false` the shard is restored (the previous
    /// `Arc` goes back, or the fresh key is removed) and `None` is returned.
    ///
    /// `accept` must not call into this map on the same shard, and so must
    /// not call whole-map operations such as `len` or `clear`. Single-key
    /// calls on other shards stay available. If `accept` panics, the tentative write is kept.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazy_shardmap::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// map.insert("hello", "world");
    ///
    /// let prev = map.insert_accept("hello", "planet", |prev| prev == Some(&"world"));
    /// assert_eq!(prev.as_deref(), Some(&"world"));
    ///
    /// let prev = map.insert_accept("hello", "world", |_| false);
    /// assert!(prev.is_none());
    /// assert_eq!(*map.get(&"hello").unwrap(), "planet");
    /// ```
    pub fn insert_accept<F>(&self, key: K, value: V, accept: F) -> Option<Arc<V>>
    where
        K: Clone,
        F: FnOnce(Option<&V>) -> bool,
    {
        self.shard_for(&key).insert_accept(key, value, accept)
    }

    /// Remove a value, letting `accept` inspect it and veto the removal.
    ///
    /// Mirrors [`insert_accept`](Self::insert_accept): on acceptance the
    /// removed value is returned, on rejection it is put back under the same
    /// key (same `Arc`) and `None` is returned. `accept` sees `None` when the
    /// key was absent.
    pub fn remove_accept<Q, F>(&self, key: &Q, accept: F) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> bool,
    {
        self.shard_for(key).remove_accept(key, accept)
    }

    /// Get the total number of entries across all shards.
    ///
    /// Shards are counted one at a time, each under its exclusive lock. The
    /// total is exact when nothing else is writing; under concurrent writes
    /// it is only approximate, since shards already counted may change
    /// before the last one is reached.
    pub fn len(&self) -> usize {
        self.shards().slots.iter().map(|shard| shard.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.shards().slots.iter().all(|shard| shard.is_empty())
    }

    /// Visit every entry until `visit` returns `false`.
    ///
    /// Shards are walked in order, each under its shared lock. Returning
    /// `false` ends the walk at once; no further entries or shards are
    /// visited.
    ///
    /// Any call into this map from `visit` that touches the shard being
    /// walked may deadlock. That covers `insert`, `remove`, `len` and
    /// `clear`, and also a nested `get` once a writer is queued on that
    /// shard, since the lock is write-preferring.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazy_shardmap::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// for i in 0..10 {
    ///     map.insert(i, i * 2);
    /// }
    ///
    /// let mut sum = 0;
    /// map.range(|_, value| {
    ///     sum += *value;
    ///     true
    /// });
    /// assert_eq!(sum, 90);
    /// ```
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for shard in self.shards().slots.iter() {
            if !shard.range(&mut visit) {
                break;
            }
        }
    }

    /// Remove every entry. Shard count and routing are unchanged.
    ///
    /// Shards are emptied one at a time, so concurrent writers may land
    /// entries in shards that were already cleared.
    pub fn clear(&self) {
        let shards = self.shards();
        for shard in shards.slots.iter() {
            shard.clear(shards.capacity_per_shard);
        }
        tracing::trace!(shard_count = shards.slots.len(), "cleared all shards");
    }

    /// Number of entries in each shard, in shard order.
    pub fn shard_loads(&self) -> Vec<usize> {
        self.shards().slots.iter().map(|shard| shard.load()).collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shards = &self.shards().slots;
        let shard_sizes: Vec<usize> = shards.iter().map(|s| s.load()).collect();
        let operations: Vec<ShardOps> = shards.iter().map(|s| s.stats()).collect();
        let size: usize = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }

    /// Copy every entry out into an owned iterator.
    ///
    /// Built with the same shard-by-shard walk as [`range`](Self::range), so
    /// it holds no locks once returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazy_shardmap::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// map.insert("key1", "value1");
    /// map.insert("key2", "value2");
    ///
    /// assert_eq!(map.iter_snapshot().count(), 2);
    /// ```
    pub fn iter_snapshot(&self) -> SnapshotIter<K, V>
    where
        K: Clone,
    {
        let mut entries = Vec::new();
        for shard in self.shards().slots.iter() {
            shard.collect_into(&mut entries);
        }
        SnapshotIter::new(entries)
    }
}

impl<K, V> Default for ShardMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

use crate::stats::{ShardOps, ShardStats};
use crate::store::ShardStore;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::borrow::Borrow;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// A single shard: one store behind one read-write lock.
pub(crate) struct Shard<K, V, S> {
    store: RwLock<S>,
    stats: ShardStats,
    _entry: PhantomData<fn() -> (K, V)>,
}

impl<K, V, S> Shard<K, V, S>
where
    K: Hash + Eq,
    S: ShardStore<K, Arc<V>>,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            store: RwLock::new(S::with_capacity(capacity)),
            stats: ShardStats::new(),
            _entry: PhantomData,
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, S> {
        let guard = self.store.read();
        self.stats.record_lock_acquisition();
        guard
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, S> {
        let guard = self.store.write();
        self.stats.record_lock_acquisition();
        guard
    }

    /// Insert a key-value pair, returning the previous value if any.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let prev = self.write().set(key, Arc::new(value));
        self.stats.record_write();
        prev
    }

    /// Get a value by key, returning an Arc to enable zero-copy access.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let result = self.read().get(key).cloned();
        if result.is_some() {
            self.stats.record_read();
        }
        result
    }

    /// Remove a key-value pair, returning the value if it existed.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let result = self.write().delete(key);
        if result.is_some() {
            self.stats.record_remove();
        }
        result
    }

    /// Check if a key exists without cloning the value.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().get(key).is_some()
    }

    /// Tentatively insert, then let `accept` decide whether the write stands.
    ///
    /// The exclusive lock is held across the callback. On rejection the
    /// shard is put back exactly as it was: a fresh key is deleted again, an
    /// overwritten key gets its previous `Arc` back.
    pub fn insert_accept<F>(&self, key: K, value: V, accept: F) -> Option<Arc<V>>
    where
        K: Clone,
        F: FnOnce(Option<&V>) -> bool,
    {
        let mut store = self.write();
        let prev = store.set(key.clone(), Arc::new(value));
        if accept(prev.as_deref()) {
            self.stats.record_write();
            return prev;
        }

        match prev {
            Some(prev) => {
                store.set(key, prev);
            }
            None => {
                store.delete(&key);
            }
        }
        self.stats.record_rejection();
        None
    }

    /// Tentatively remove, then let `accept` decide whether the removal stands.
    ///
    /// On rejection the removed `Arc` is reinserted under the same key.
    pub fn remove_accept<Q, F>(&self, key: &Q, accept: F) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> bool,
    {
        let mut store = self.write();
        let prev = store.delete(key);
        if accept(prev.as_deref()) {
            if prev.is_some() {
                self.stats.record_remove();
            }
            return prev;
        }

        if let Some(prev) = prev {
            store.set(key.to_owned(), prev);
        }
        self.stats.record_rejection();
        None
    }

    /// Entry count taken under the exclusive lock, like every mutating path.
    pub fn len(&self) -> usize {
        self.write().len()
    }

    /// Entry count taken under the shared lock, for introspection.
    pub fn load(&self) -> usize {
        self.read().len()
    }

    /// Check if this shard is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Visit entries under the shared lock. Returns `false` if `visit` stopped
    /// the walk; the lock is released before returning either way.
    pub fn range<F>(&self, visit: &mut F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.read().range(|key, value| visit(key, &**value))
    }

    /// Clone every entry into `out` under the shared lock.
    pub fn collect_into(&self, out: &mut Vec<(K, Arc<V>)>)
    where
        K: Clone,
    {
        let store = self.read();
        out.reserve(store.len());
        store.range(|key, value| {
            out.push((key.clone(), Arc::clone(value)));
            true
        });
    }

    /// Swap in a fresh, empty store.
    pub fn clear(&self, capacity: usize) {
        let fresh = S::with_capacity(capacity);
        let old = std::mem::replace(&mut *self.write(), fresh);
        // Entries are dropped outside the lock.
        drop(old);
    }

    /// Get a snapshot of statistics for this shard.
    pub fn stats(&self) -> ShardOps {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    type TestShard = Shard<String, i32, HashMap<String, Arc<i32>>>;

    #[test]
    fn test_insert_accept_rejects_fresh_key() {
        let shard = TestShard::new(0);
        let prev = shard.insert_accept("k".to_string(), 1, |prev| {
            assert!(prev.is_none());
            false
        });
        assert!(prev.is_none());
        assert!(!shard.contains_key("k"));
        assert_eq!(shard.len(), 0);
    }

    #[test]
    fn test_insert_accept_restores_same_arc() {
        let shard = TestShard::new(0);
        shard.insert("k".to_string(), 1);
        let before = shard.get("k").unwrap();

        assert!(shard.insert_accept("k".to_string(), 2, |_| false).is_none());
        let after = shard.get("k").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_remove_accept_restores_same_arc() {
        let shard = TestShard::new(0);
        shard.insert("k".to_string(), 7);
        let before = shard.get("k").unwrap();

        assert!(shard.remove_accept("k", |prev| prev == Some(&8)).is_none());
        let after = shard.get("k").unwrap();
        assert!(Arc::ptr_eq(&before, &after));

        assert_eq!(shard.remove_accept("k", |prev| prev == Some(&7)).as_deref(), Some(&7));
        assert!(shard.is_empty());
    }

    #[test]
    fn test_clear_keeps_shard_usable() {
        let shard = TestShard::new(8);
        for i in 0..8 {
            shard.insert(format!("k{}", i), i);
        }
        assert_eq!(shard.load(), 8);

        shard.clear(8);
        assert_eq!(shard.len(), 0);
        shard.insert("again".to_string(), 1);
        assert_eq!(shard.load(), 1);
    }
}

//! The single-threaded table that backs one shard.
//!
//! A [`ShardStore`] never sees concurrency: every call happens while the
//! owning shard's lock is held. The map only needs the six operations below,
//! so any hash table that can provide them can back a shard.

use hashbrown::HashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Per-shard key/value table.
pub trait ShardStore<K, T> {
    /// Create an empty store. `capacity` is a hint; `0` means no hint.
    fn with_capacity(capacity: usize) -> Self;

    /// Insert or overwrite, returning the previous value.
    fn set(&mut self, key: K, value: T) -> Option<T>;

    /// Look up a value.
    fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Remove a value, returning it if it was present.
    fn delete<Q>(&mut self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit entries until `visit` returns `false`.
    ///
    /// Returns `false` if the visit was stopped early.
    fn range<F>(&self, visit: F) -> bool
    where
        F: FnMut(&K, &T) -> bool;
}

impl<K, T> ShardStore<K, T> for HashMap<K, T>
where
    K: Hash + Eq,
{
    fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            HashMap::new()
        } else {
            HashMap::with_capacity(capacity)
        }
    }

    #[inline]
    fn set(&mut self, key: K, value: T) -> Option<T> {
        self.insert(key, value)
    }

    #[inline]
    fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        HashMap::get(self, key)
    }

    #[inline]
    fn delete<Q>(&mut self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key)
    }

    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn range<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&K, &T) -> bool,
    {
        self.iter().all(|(key, value)| visit(key, value))
    }
}

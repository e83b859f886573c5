use std::sync::Arc;

/// Snapshot-based iterator over the entries of a map.
///
/// Entries are copied out shard by shard, each under its shared lock, before
/// the iterator is returned. It holds no locks and won't see modifications
/// made after its shard was copied.
pub struct SnapshotIter<K, V> {
    entries: std::vec::IntoIter<(K, Arc<V>)>,
}

impl<K, V> SnapshotIter<K, V> {
    pub(crate) fn new(entries: Vec<(K, Arc<V>)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for SnapshotIter<K, V> {
    type Item = (K, Arc<V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for SnapshotIter<K, V> {}

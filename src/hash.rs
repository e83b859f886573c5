use std::hash::{Hash, Hasher};

/// Hash function implementation for shard assignment.
/// Uses an enum to avoid trait object limitations with generics.
///
/// Every variant is seeded with fixed keys, so a key lands on the same shard
/// in every map built with the same hash function and shard count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShardHasher {
    /// AHash with fixed keys (default).
    #[default]
    AHash,
    /// FxHash (faster but potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
    /// XXH3 64-bit.
    #[cfg(feature = "xxhash")]
    XxHash,
}

impl ShardHasher {
    /// Hash a key to determine which shard it belongs to.
    pub fn hash_key<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        match self {
            ShardHasher::AHash => {
                let mut hasher = ahash::AHasher::default();
                key.hash(&mut hasher);
                hasher.finish()
            }
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => {
                let mut hasher = fxhash::FxHasher::default();
                key.hash(&mut hasher);
                hasher.finish()
            }
            #[cfg(feature = "xxhash")]
            ShardHasher::XxHash => {
                let mut hasher = xxhash_rust::xxh3::Xxh3::new();
                key.hash(&mut hasher);
                hasher.finish()
            }
        }
    }
}

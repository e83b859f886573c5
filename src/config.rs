use crate::error::Error;
use crate::hash::ShardHasher;
use crate::shardmap::ShardMap;
use crate::store::ShardStore;
use std::hash::Hash;
use std::sync::Arc;

/// Shards per available CPU when the shard count is derived at first use.
pub const SHARDS_PER_CPU: usize = 16;

/// Which hash function to use for shard assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// Use ahash (default, fast and well-distributed).
    #[default]
    AHash,
    /// Use fxhash (faster but potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
    /// Use XXH3, 64-bit.
    #[cfg(feature = "xxhash")]
    XxHash,
}

/// Configuration for a ShardMap instance.
///
/// Nothing here allocates. Shards are created on the first operation on the
/// map, and the shard count is decided then.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub(crate) capacity: usize,
    pub(crate) shard_count: Option<usize>,
    pub(crate) hash_function: HashFunction,
}

impl Config {
    /// Create a new config with defaults (no capacity hint, derived shard
    /// count, ahash).
    pub fn new() -> Self {
        Self::default()
    }

    /// Total capacity hint, split evenly across shards. `0` means no hint.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Pin the number of shards instead of deriving it from the CPU count.
    /// Must be a power of two and greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        validate_shard_count(count)?;
        self.shard_count = Some(count);
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hash_function = hash_fn;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        match self.shard_count {
            Some(count) => validate_shard_count(count),
            None => Ok(()),
        }
    }

    /// The shard count to use, reading the CPU count if none was pinned.
    pub(crate) fn resolve_shard_count(&self) -> usize {
        self.shard_count
            .unwrap_or_else(|| derived_shard_count(num_cpus::get()))
    }
}

/// Smallest power of two that is at least `cpus * SHARDS_PER_CPU`.
pub(crate) fn derived_shard_count(cpus: usize) -> usize {
    cpus.max(1)
        .saturating_mul(SHARDS_PER_CPU)
        .next_power_of_two()
}

fn validate_shard_count(count: usize) -> Result<(), Error> {
    if count == 0 || !count.is_power_of_two() {
        return Err(Error::InvalidShardCount(count));
    }
    Ok(())
}

/// Builder for creating a ShardMap with custom configuration.
#[derive(Debug, Default)]
pub struct ShardMapBuilder {
    config: Config,
}

impl ShardMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total capacity hint, split evenly across shards.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.capacity(capacity);
        self
    }

    /// Pin the number of shards. Must be a power of two and greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Build a ShardMap backed by the default store.
    pub fn build<K, V>(self) -> Result<ShardMap<K, V>, Error>
    where
        K: Hash + Eq,
    {
        ShardMap::with_config(self.config)
    }

    /// Build a ShardMap whose shards are backed by `S`.
    pub fn build_with_store<K, V, S>(self) -> Result<ShardMap<K, V, S>, Error>
    where
        K: Hash + Eq,
        S: ShardStore<K, Arc<V>>,
    {
        ShardMap::with_config(self.config)
    }
}

/// Create a hash function instance based on the configuration.
pub(crate) fn create_hasher(hash_fn: HashFunction) -> ShardHasher {
    match hash_fn {
        HashFunction::AHash => ShardHasher::AHash,
        #[cfg(feature = "fxhash")]
        HashFunction::FxHash => ShardHasher::FxHash,
        #[cfg(feature = "xxhash")]
        HashFunction::XxHash => ShardHasher::XxHash,
    }
}

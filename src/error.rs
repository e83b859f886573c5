/// Errors that can occur when configuring a ShardMap.
///
/// Map operations themselves never fail; a missing key is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The shard count is invalid (must be a power of two and greater than 0).
    #[error("shard count must be a power of two and greater than 0, got {0}")]
    InvalidShardCount(usize),
}

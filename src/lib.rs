//! # lazy-shardmap
//!
//! A thread-safe map that splits its entries across many independently
//! locked shards, so threads working on different keys rarely wait on each
//! other. Values are stored behind `Arc<V>` and shared without copying.
//!
//! ## Features
//!
//! - **Lazy**: no shard is allocated until the first operation. The shard
//!   count is fixed then (a power of two, 16 per available CPU by default).
//! - **Thread-Safe**: every shard is guarded by its own read-write lock.
//! - **Accept/Reject Mutations**: `insert_accept` and `remove_accept` let a
//!   callback inspect the previous value and veto the change while the
//!   shard is locked.
//! - **Deterministic**: the same key always maps to the same shard.
//! - **Pluggable Store**: shards are backed by any [`ShardStore`].
//! - **Statistics**: per-shard sizes and (with `metrics`) operation counts.
//!
//! ## Example
//!
//! ```rust
//! use lazy_shardmap::ShardMap;
//!
//! let map = ShardMap::new();
//!
//! map.insert("hello", "world");
//! assert_eq!(*map.get(&"hello").unwrap(), "world");
//!
//! // Only overwrite if the current value is what we expect.
//! let prev = map.insert_accept("hello", "planet", |prev| prev == Some(&"world"));
//! assert_eq!(prev.as_deref(), Some(&"world"));
//!
//! // Stop ranging after the first entry.
//! let mut seen = 0;
//! map.range(|_, _| {
//!     seen += 1;
//!     false
//! });
//! assert_eq!(seen, 1);
//!
//! map.clear();
//! assert!(map.is_empty());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use lazy_shardmap::{ShardMapBuilder, HashFunction};
//!
//! let map = ShardMapBuilder::new()
//!     .capacity(1 << 16)
//!     .shard_count(32)?  // Must be power of two
//!     .hash_function(HashFunction::AHash)
//!     .build::<String, i32>()?;
//! assert_eq!(map.shard_count(), 32);
//! # Ok::<(), lazy_shardmap::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Hash function implementations.
pub mod hash;
/// Iterator implementations.
pub mod iter;
/// Internal shard implementation.
mod shard;
/// Main ShardMap implementation.
pub mod shardmap;
/// Statistics and metrics collection.
pub mod stats;
/// Per-shard storage trait.
pub mod store;

// Re-export main types
pub use config::{Config, HashFunction, ShardMapBuilder};
pub use error::Error;
pub use shardmap::{DefaultStore, ShardMap};
pub use stats::{ShardOps, Stats};
pub use store::ShardStore;

//! Cache-aside layer in front of the score store.
//!
//! This module provides:
//! - `KeyValueCache`, the backend capability (get/set/delete/incr with TTL)
//! - `MemoryCache` and `RedisCache` backends
//! - `ScoreCache`, the read-through / invalidate-on-write consistency layer
//! - `keys`, the derived key scheme for every cached projection

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod keys;
pub mod layer;
pub mod memory;
pub mod redis;

pub use layer::{CachePolicy, ScoreCache};
pub use memory::MemoryCache;
pub use self::redis::RedisCache;

/// Cache backend failure. Never surfaced to callers of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache call timed out: {0}")]
    Timeout(&'static str),
    #[error("cache value could not be decoded: {0}")]
    Decode(String),
    #[error("cache backend does not support {0}")]
    Unsupported(&'static str),
}

/// Minimal key-value capability the cache layer needs from a backend.
#[async_trait]
pub trait KeyValueCache: Send + Sync + fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically increment an integer counter, creating it at 0 first.
    async fn incr(&self, key: &str) -> Result<i64, CacheError>;

    /// Remove every key starting with `prefix`. Best effort.
    async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Err(CacheError::Unsupported("prefix deletion"))
    }
}

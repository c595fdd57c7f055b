//! Read-through cache with invalidate-on-write.
//!
//! Cache failures never reach the caller: reads degrade to the loader and
//! failed invalidations are retried in the background with exponential
//! backoff.

use super::{keys, CacheError, KeyValueCache};
use backoff::future::retry;
use backoff::ExponentialBackoff;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Deadlines and TTLs applied by [`ScoreCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Deadline for a single backend call.
    pub op_timeout: Duration,
    /// Match fixtures; rarely change.
    pub reference_ttl: Duration,
    /// Scorecards, innings and current-over projections.
    pub aggregate_ttl: Duration,
    /// Series listings and counts.
    pub list_ttl: Duration,
    /// How long a failed invalidation keeps being retried.
    pub retry_window: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_millis(50),
            reference_ttl: Duration::from_secs(6 * 60 * 60),
            aggregate_ttl: Duration::from_secs(30 * 60),
            list_ttl: Duration::from_secs(15 * 60),
            retry_window: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
enum Invalidation {
    Key(String),
    Prefix(String),
    Version(String),
}

impl Invalidation {
    async fn apply(&self, backend: &dyn KeyValueCache, limit: Duration) -> Result<(), CacheError> {
        match self {
            Invalidation::Key(key) => bounded(limit, "delete", backend.delete(key)).await,
            Invalidation::Prefix(prefix) => {
                bounded(limit, "delete_prefix", backend.delete_prefix(prefix))
                    .await
                    .map(|_| ())
            }
            Invalidation::Version(namespace) => {
                bounded(limit, "incr", backend.incr(&keys::version(namespace)))
                    .await
                    .map(|_| ())
            }
        }
    }
}

async fn bounded<T, F>(limit: Duration, op: &'static str, call: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, CacheError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(CacheError::Timeout(op)))
}

/// Cache-aside front for the score store.
///
/// A committed write is visible to the next read once its namespace version
/// bump lands. Two windows can still serve a projection from before the write:
///
/// - the bump failed and the backend recovers before the background retry
///   does; reads see the old version until the retry lands or the retry
///   window and the entry TTL run out;
/// - the backend evicts a version counter, which then restarts at 0 and can
///   point back at entries cached under that version until their TTL expires.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    backend: Arc<dyn KeyValueCache>,
    policy: CachePolicy,
}

impl ScoreCache {
    pub fn new(backend: Arc<dyn KeyValueCache>, policy: CachePolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Return the cached value under `key`, or run `loader` and cache its result.
    ///
    /// Loader errors propagate unchanged and are never cached.
    pub async fn get_or_set<T, E, F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let limit = self.policy.op_timeout;

        match bounded(limit, "get", self.backend.get(key)).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!(key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    if let Err(e) = bounded(limit, "delete", self.backend.delete(key)).await {
                        debug!(key, error = %e, "Could not remove undecodable entry");
                    }
                }
            },
            Ok(None) => debug!(key, "Cache miss"),
            Err(e) => warn!(key, error = %e, "Cache read failed, loading from store"),
        }

        let value = loader().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = bounded(limit, "set", self.backend.set_ex(key, &raw, ttl)).await {
                    warn!(key, error = %e, "Cache populate failed");
                }
            }
            Err(e) => warn!(key, error = %e, "Could not encode value for cache"),
        }

        Ok(value)
    }

    /// Like [`get_or_set`](Self::get_or_set) for a projection under the
    /// current version of `namespace`. Without a readable version the loader
    /// runs uncached.
    pub async fn get_or_set_versioned<T, E, F, Fut>(
        &self,
        namespace: &str,
        suffix: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.current_version(namespace).await {
            Some(version) => {
                let key = keys::scoped(namespace, version, suffix);
                self.get_or_set(&key, ttl, loader).await
            }
            None => loader().await,
        }
    }

    async fn current_version(&self, namespace: &str) -> Option<i64> {
        let key = keys::version(namespace);
        match bounded(self.policy.op_timeout, "get", self.backend.get(&key)).await {
            Ok(None) => Some(0),
            Ok(Some(raw)) => match raw.parse::<i64>() {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!(key = %key, error = %e, "Unreadable cache version counter");
                    None
                }
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Cache version read failed");
                None
            }
        }
    }

    /// Delete one key.
    pub async fn invalidate(&self, key: &str) {
        self.run(Invalidation::Key(key.to_string())).await;
    }

    /// Delete every key under `prefix`. Backends without prefix support skip it.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        self.run(Invalidation::Prefix(prefix.to_string())).await;
    }

    /// Orphan every projection of `namespace` by bumping its version.
    pub async fn invalidate_namespace(&self, namespace: &str) {
        self.run(Invalidation::Version(namespace.to_string())).await;
    }

    async fn run(&self, action: Invalidation) {
        match action
            .apply(self.backend.as_ref(), self.policy.op_timeout)
            .await
        {
            Ok(()) => debug!(?action, "Cache invalidated"),
            Err(CacheError::Unsupported(what)) => {
                debug!(?action, what, "Cache backend cannot invalidate, skipping")
            }
            Err(e) => {
                warn!(?action, error = %e, "Cache invalidation failed, retrying in background");
                self.spawn_retry(action);
            }
        }
    }

    fn spawn_retry(&self, action: Invalidation) {
        let backend = self.backend.clone();
        let limit = self.policy.op_timeout;
        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(50),
            max_elapsed_time: Some(self.policy.retry_window),
            ..Default::default()
        };

        tokio::spawn(async move {
            let result = retry(policy, || async {
                action
                    .apply(backend.as_ref(), limit)
                    .await
                    .map_err(|e| match e {
                        CacheError::Backend(_) | CacheError::Timeout(_) => {
                            backoff::Error::transient(e)
                        }
                        _ => backoff::Error::permanent(e),
                    })
            })
            .await;

            match result {
                Ok(()) => debug!(?action, "Cache invalidation succeeded on retry"),
                Err(e) => error!(?action, error = %e, "Cache invalidation abandoned"),
            }
        });
    }
}

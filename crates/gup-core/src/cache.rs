//! Short-lived memoization of workspace statuses.
//!
//! Status resolution shells out to git several times, and hosts tend to ask
//! for the same root many times in a burst. [`StatusCache`] keeps the last
//! status per [`RepositoryRoot`] for a fixed time-to-live.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::constants::DEFAULT_CACHE_TTL;
use crate::status::WorkspaceStatus;
use crate::workspace::RepositoryRoot;

#[derive(Debug, Clone)]
struct CacheEntry {
    status: WorkspaceStatus,
    created_at: Instant,
}

/// Per-root TTL cache of [`WorkspaceStatus`] values.
///
/// A poisoned lock degrades every operation to a miss or a no-op.
///
/// Every invalidation bumps a generation counter. A status computed before an
/// invalidation is stored with [`StatusCache::put_if_current`], which drops it
/// when the generation has moved on.
#[derive(Debug)]
pub struct StatusCache {
    ttl: Duration,
    entries: Mutex<HashMap<RepositoryRoot, CacheEntry>>,
    generation: AtomicU64,
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl StatusCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> Option<MutexGuard<'_, HashMap<RepositoryRoot, CacheEntry>>> {
        match self.entries.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("Status cache lock poisoned, bypassing cache");
                None
            }
        }
    }

    /// Fresh status for `root`. Expired entries are evicted.
    pub fn get(&self, root: &RepositoryRoot) -> Option<WorkspaceStatus> {
        let mut entries = self.lock()?;

        match entries.get(root) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                tracing::debug!("Status cache hit for {}", root);
                Some(entry.status.clone())
            }
            Some(_) => {
                tracing::debug!("Status cache entry for {} expired", root);
                entries.remove(root);
                None
            }
            None => {
                tracing::debug!("Status cache miss for {}", root);
                None
            }
        }
    }

    /// Store `status` for `root`, replacing any previous entry.
    pub fn put(&self, root: &RepositoryRoot, status: WorkspaceStatus) {
        if let Some(mut entries) = self.lock() {
            entries.insert(
                root.clone(),
                CacheEntry {
                    status,
                    created_at: Instant::now(),
                },
            );
        }
    }

    /// Current invalidation generation. Read it before computing a status
    /// that will be passed to [`StatusCache::put_if_current`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `status` for `root` unless the cache was invalidated since
    /// `generation` was read. Returns whether it was stored.
    pub fn put_if_current(
        &self,
        root: &RepositoryRoot,
        status: WorkspaceStatus,
        generation: u64,
    ) -> bool {
        let Some(mut entries) = self.lock() else {
            return false;
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding status for {} computed before an invalidation", root);
            return false;
        }
        entries.insert(
            root.clone(),
            CacheEntry {
                status,
                created_at: Instant::now(),
            },
        );
        true
    }

    /// Drop the entry for `root`, or every entry when `root` is `None`.
    pub fn invalidate(&self, root: Option<&RepositoryRoot>) {
        let entries = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        let Some(mut entries) = entries else {
            return;
        };
        match root {
            Some(root) => {
                entries.remove(root);
            }
            None => entries.clear(),
        }
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |entries| entries.len())
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

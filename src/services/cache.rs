use moka::future::{Cache, CacheBuilder};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use crate::core::session::SearchSession;
use crate::error::FinderError;
use crate::models::Catalog;

/// In-memory cache of the filter catalog
///
/// One entry is kept for `ttl_secs` and re-read from the directory after
/// it expires.
pub struct CatalogCache {
    cache: Cache<String, Catalog>,
}

impl CatalogCache {
    pub fn new(ttl_secs: u64) -> Self {
        let cache = CacheBuilder::new(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Cached catalog, or the result of `load` on a miss
    ///
    /// A failed load is returned to the caller and nothing is cached.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Catalog, FinderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Catalog, FinderError>>,
    {
        let key = CacheKey::catalog();
        if let Some(catalog) = self.cache.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(catalog);
        }

        tracing::trace!("Cache miss: {}", key);
        let catalog = load().await?;
        self.cache.insert(key, catalog.clone()).await;
        Ok(catalog)
    }
}

/// Live search sessions keyed by client-supplied session id
///
/// Idle sessions are evicted after `idle_secs`; the store never holds more
/// than `capacity` sessions.
pub struct SessionStore {
    sessions: Cache<String, Arc<SearchSession>>,
    initial_location: String,
}

impl SessionStore {
    pub fn new(capacity: u64, idle_secs: u64, initial_location: impl Into<String>) -> Self {
        let sessions = CacheBuilder::new(capacity)
            .time_to_idle(Duration::from_secs(idle_secs))
            .build();

        Self {
            sessions,
            initial_location: initial_location.into(),
        }
    }

    /// The session for `session_id`, created on first use
    pub async fn get_or_create(&self, session_id: &str) -> Arc<SearchSession> {
        let key = CacheKey::session(session_id);
        let initial_location = self.initial_location.clone();
        self.sessions
            .get_with(key, async move {
                tracing::debug!("Starting search session {}", session_id);
                Arc::new(SearchSession::new(initial_location))
            })
            .await
    }

    /// The session for `session_id` if it is still live
    pub async fn get(&self, session_id: &str) -> Option<Arc<SearchSession>> {
        self.sessions.get(&CacheKey::session(session_id)).await
    }

    pub async fn stats(&self) -> CacheStats {
        self.sessions.run_pending_tasks().await;
        CacheStats {
            active_sessions: self.sessions.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub active_sessions: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build the cache key for the filter catalog
    pub fn catalog() -> String {
        "catalog".to_string()
    }

    /// Build a cache key for a search session
    pub fn session(session_id: &str) -> String {
        format!("session:{}", session_id.trim())
    }
}

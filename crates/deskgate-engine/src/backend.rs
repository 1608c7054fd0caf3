//! Search-backend URL cache.
//!
//! A tenant may carry its own log/transaction search endpoint. Routing
//! a downstream query repeats the same tenant lookup, so the resolved
//! URL is held in a small TTL cache. The cache is bounded (one entry
//! per key), invalidated synchronously on tenant update, and has no
//! connection to the authorization path — a permission decision must
//! never read it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use deskgate_core::repository::TenantRepository;
use tracing::debug;
use uuid::Uuid;

use crate::error::EngineResult;

/// Cache key: tenant plus the optional chat/topic the query is routed
/// for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendKey {
    pub tenant_id: Uuid,
    pub chat_id: Option<String>,
    pub topic_id: Option<String>,
}

impl BackendKey {
    pub fn tenant(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            chat_id: None,
            topic_id: None,
        }
    }
}

struct Entry {
    url: Option<String>,
    inserted_at: Instant,
}

/// Time-boxed cache of resolved search-backend URLs.
pub struct BackendUrlCache {
    entries: Mutex<HashMap<BackendKey, Entry>>,
    ttl: Duration,
}

impl BackendUrlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// A hit that has outlived the TTL counts as a miss and is dropped.
    pub fn get(&self, key: &BackendKey) -> Option<Option<String>> {
        let mut entries = self.entries.lock().expect("backend cache poisoned");
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.url.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: BackendKey, url: Option<String>) {
        let mut entries = self.entries.lock().expect("backend cache poisoned");
        entries.insert(
            key,
            Entry {
                url,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry belonging to a tenant. Called synchronously
    /// when the tenant's backend URL changes.
    pub fn invalidate_tenant(&self, tenant_id: Uuid) {
        let mut entries = self.entries.lock().expect("backend cache poisoned");
        let before = entries.len();
        entries.retain(|key, _| key.tenant_id != tenant_id);
        debug!(
            %tenant_id,
            dropped = before - entries.len(),
            "invalidated backend url cache entries"
        );
    }

    /// Drop expired entries; keeps the map bounded under churn.
    pub fn purge_expired(&self) {
        let mut entries = self.entries.lock().expect("backend cache poisoned");
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().expect("backend cache poisoned").len()
    }
}

/// Resolves tenant → search-backend URL through the cache.
pub struct BackendResolver<'a, T: TenantRepository> {
    tenants: &'a T,
    cache: &'a BackendUrlCache,
}

impl<'a, T: TenantRepository> BackendResolver<'a, T> {
    pub fn new(tenants: &'a T, cache: &'a BackendUrlCache) -> Self {
        Self { tenants, cache }
    }

    /// The tenant's backend URL, from cache when fresh. `None` means
    /// the tenant has no override and the caller falls back to its
    /// global endpoint.
    pub async fn resolve(&self, key: BackendKey) -> EngineResult<Option<String>> {
        if let Some(url) = self.cache.get(&key) {
            return Ok(url);
        }

        let tenant = self.tenants.get_by_id(key.tenant_id).await?;
        self.cache
            .insert(key, tenant.search_backend_url.clone());
        Ok(tenant.search_backend_url)
    }
}

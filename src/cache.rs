use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// Identifies one cached query: the entity it reads and the scope (user id)
/// it was read for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub entity: &'static str,
    pub scope: String,
}

impl QueryKey {
    pub fn new(entity: &'static str, scope: impl Into<String>) -> Self {
        Self {
            entity,
            scope: scope.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    stale: bool,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Entries<V> {
    map: HashMap<QueryKey, CacheEntry<V>>,
    /// Bumped by every invalidation of the entity, cached or not.
    generations: HashMap<&'static str, u64>,
}

impl<V> Entries<V> {
    fn generation(&self, entity: &str) -> u64 {
        self.generations.get(entity).copied().unwrap_or(0)
    }
}

/// Ticket handed out by [`QueryCache::begin_fetch`]. A fetch that started
/// before an invalidation of its entity cannot be stored as fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Query results keyed by [`QueryKey`], each with a freshness flag.
///
/// Invalidation marks entries stale and bumps the entity generation, so a
/// read already in flight lands as stale and the next reader refetches.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: RwLock<Entries<V>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                generations: HashMap::new(),
            }),
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached data, only if it has not been invalidated.
    pub async fn fresh(&self, key: &QueryKey) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .map
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.data.clone())
    }

    /// Call before reading from the store; pass the ticket to [`QueryCache::store`].
    pub async fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let entries = self.entries.read().await;
        FetchTicket(entries.generation(key.entity))
    }

    /// Saves a fetch result. Returns false, and saves it stale, when the
    /// entity was invalidated after `ticket` was taken.
    pub async fn store(&self, key: QueryKey, data: V, ticket: FetchTicket) -> bool {
        let mut entries = self.entries.write().await;
        let current = entries.generation(key.entity) == ticket.0;
        if !current {
            debug!("{} result for {} was invalidated mid-fetch", key.entity, key.scope);
        }
        entries.map.insert(
            key,
            CacheEntry {
                data,
                stale: !current,
                fetched_at: Utc::now(),
            },
        );
        current
    }

    /// Marks every key for `entity` stale. Returns how many entries were hit.
    pub async fn invalidate(&self, entity: &'static str) -> usize {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(entity).or_insert(0) += 1;
        let mut count = 0;
        for (key, entry) in entries.map.iter_mut() {
            if key.entity == entity {
                entry.stale = true;
                count += 1;
            }
        }
        debug!("invalidated {} cached {} queries", count, entity);
        count
    }

    /// Drops stale entries and entries fetched more than `max_age` before `now`.
    pub async fn evict_idle(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.map.len();
        entries
            .map
            .retain(|_, entry| !entry.stale && now - entry.fetched_at <= max_age);
        before - entries.map.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }
}

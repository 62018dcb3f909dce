//! Process local TTL cache for dropdown/reference data.
//!
//! Entries are keyed by `(kind, include_deleted, owner)`. Writes never update
//! an entry in place: the engine drops both `include_deleted` variants of the
//! touched kind for the owner, and the next read repopulates them.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::RwLock, time::Instant};
use uuid::Uuid;

use crate::EntityStatus;

/// Default lifetime of a cached dropdown (3 days).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    AccountTypes,
    Currencies,
    Categories,
    Accounts,
}

impl ReferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountTypes => "account_types",
            Self::Currencies => "currencies",
            Self::Categories => "categories",
            Self::Accounts => "accounts",
        }
    }
}

/// An entry of a dropdown list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: Uuid,
    pub name: String,
    /// `None` for system rows shared by every user.
    pub owner_id: Option<Uuid>,
    pub status: EntityStatus,
}

impl ReferenceItem {
    pub fn is_system(&self) -> bool {
        self.owner_id.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: ReferenceKind,
    include_deleted: bool,
    owner_id: Uuid,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    stored_at: Instant,
    items: Arc<Vec<ReferenceItem>>,
}

#[derive(Clone, Debug)]
pub struct ReferenceCache {
    ttl: Duration,
    inner: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ReferenceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) async fn get(
        &self,
        kind: ReferenceKind,
        include_deleted: bool,
        owner_id: Uuid,
    ) -> Option<Arc<Vec<ReferenceItem>>> {
        let key = CacheKey {
            kind,
            include_deleted,
            owner_id,
        };
        let guard = self.inner.read().await;
        guard
            .get(&key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.items))
    }

    pub(crate) async fn insert(
        &self,
        kind: ReferenceKind,
        include_deleted: bool,
        owner_id: Uuid,
        items: Vec<ReferenceItem>,
    ) -> Arc<Vec<ReferenceItem>> {
        let items = Arc::new(items);
        let key = CacheKey {
            kind,
            include_deleted,
            owner_id,
        };
        let mut guard = self.inner.write().await;
        guard.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        guard.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                items: Arc::clone(&items),
            },
        );
        items
    }

    /// Drops both `include_deleted` variants of `kind` for `owner_id`.
    pub(crate) async fn invalidate(&self, kind: ReferenceKind, owner_id: Uuid) {
        let mut guard = self.inner.write().await;
        for include_deleted in [false, true] {
            guard.remove(&CacheKey {
                kind,
                include_deleted,
                owner_id,
            });
        }
        tracing::debug!(kind = kind.as_str(), %owner_id, "dropdown cache invalidated");
    }
}

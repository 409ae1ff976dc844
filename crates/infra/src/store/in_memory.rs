use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use revdesk_auth::{Identity, NewIdentity};
use revdesk_core::{RecordId, UserId};
use revdesk_reporting::{RevenueFilter, RevenueRecord};

use super::{IdentityStore, RevenueStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct IdentityTables {
    by_id: BTreeMap<UserId, Identity>,
    by_username: HashMap<String, UserId>,
}

impl IdentityTables {
    fn replace(&mut self, identity: Identity) -> Result<(), StoreError> {
        let previous = self
            .by_id
            .get(&identity.id)
            .map(|i| i.username.clone())
            .ok_or_else(|| StoreError::NotFound(format!("user {}", identity.id)))?;

        if previous != identity.username {
            if self.by_username.contains_key(&identity.username) {
                return Err(StoreError::Conflict(format!(
                    "username '{}' already exists",
                    identity.username
                )));
            }
            self.by_username.remove(&previous);
            self.by_username.insert(identity.username.clone(), identity.id);
        }

        self.by_id.insert(identity.id, identity);
        Ok(())
    }
}

/// In-memory identity store for tests/dev. Ids start at 1.
#[derive(Debug)]
pub struct InMemoryIdentityStore {
    tables: RwLock<IdentityTables>,
    next_id: AtomicU64,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(IdentityTables::default()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn insert(&self, new: NewIdentity, now: DateTime<Utc>) -> Result<Identity, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        if tables.by_username.contains_key(&new.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                new.username
            )));
        }

        let id = UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let identity = new.into_identity(id, now);
        tables.by_username.insert(identity.username.clone(), id);
        tables.by_id.insert(id, identity.clone());
        Ok(identity)
    }

    fn get(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.by_id.get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    fn update(&self, identity: Identity) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.replace(identity)
    }

    fn modify(
        &self,
        id: UserId,
        change: &mut dyn FnMut(&mut Identity),
    ) -> Result<Identity, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let mut identity = tables
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        change(&mut identity);
        identity.id = id;
        tables.replace(identity.clone())?;
        Ok(identity)
    }

    fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let removed = tables
            .by_id
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        tables.by_username.remove(&removed.username);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Identity>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.by_id.values().cloned().collect())
    }
}

/// In-memory revenue store for tests/dev. Ids start at 1.
#[derive(Debug)]
pub struct InMemoryRevenueStore {
    records: RwLock<BTreeMap<RecordId, RevenueRecord>>,
    next_id: AtomicU64,
}

impl InMemoryRevenueStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryRevenueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevenueStore for InMemoryRevenueStore {
    fn next_id(&self) -> RecordId {
        RecordId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert(&self, record: RevenueRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Conflict(format!("revenue record {}", record.id)));
        }
        records.insert(record.id, record);
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<RevenueRecord>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(&id).cloned())
    }

    fn update(&self, record: RevenueRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        match records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("revenue record {}", record.id))),
        }
    }

    fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("revenue record {id}")))
    }

    fn query(&self, filter: &RevenueFilter) -> Result<Vec<RevenueRecord>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}

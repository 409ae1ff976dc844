//! Persistence collaborator for identities and revenue records.
//!
//! Stores are synchronous and never hold a lock across an `.await`; handlers
//! call them directly from async code.

mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use revdesk_auth::{Identity, NewIdentity};
use revdesk_core::{DomainError, RecordId, UserId};
use revdesk_reporting::{RevenueFilter, RevenueRecord};

pub use in_memory::{InMemoryIdentityStore, InMemoryRevenueStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => DomainError::conflict(msg),
            StoreError::NotFound(msg) => DomainError::not_found(msg),
            StoreError::Unavailable(msg) => {
                tracing::error!(error = %msg, "store unavailable");
                DomainError::internal("storage unavailable")
            }
        }
    }
}

/// Identity persistence. Usernames are unique.
pub trait IdentityStore: Send + Sync {
    /// Assign the next id and persist. A taken username is a `Conflict`.
    fn insert(&self, new: NewIdentity, now: DateTime<Utc>) -> Result<Identity, StoreError>;
    fn get(&self, id: UserId) -> Result<Option<Identity>, StoreError>;
    fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError>;
    /// Replace a stored identity. Renaming onto a taken username is a `Conflict`.
    fn update(&self, identity: Identity) -> Result<(), StoreError>;
    /// Apply `change` to the stored identity under one write lock and return
    /// the result. Renaming onto a taken username is a `Conflict` and leaves
    /// the stored identity untouched.
    fn modify(
        &self,
        id: UserId,
        change: &mut dyn FnMut(&mut Identity),
    ) -> Result<Identity, StoreError>;
    fn delete(&self, id: UserId) -> Result<(), StoreError>;
    /// All identities in id order.
    fn list(&self) -> Result<Vec<Identity>, StoreError>;
}

impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    fn insert(&self, new: NewIdentity, now: DateTime<Utc>) -> Result<Identity, StoreError> {
        (**self).insert(new, now)
    }

    fn get(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        (**self).get(id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_username(username)
    }

    fn update(&self, identity: Identity) -> Result<(), StoreError> {
        (**self).update(identity)
    }

    fn modify(
        &self,
        id: UserId,
        change: &mut dyn FnMut(&mut Identity),
    ) -> Result<Identity, StoreError> {
        (**self).modify(id, change)
    }

    fn delete(&self, id: UserId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn list(&self) -> Result<Vec<Identity>, StoreError> {
        (**self).list()
    }
}

/// Revenue record persistence.
pub trait RevenueStore: Send + Sync {
    /// Reserve an id for a record about to be built.
    fn next_id(&self) -> RecordId;
    fn insert(&self, record: RevenueRecord) -> Result<(), StoreError>;
    fn get(&self, id: RecordId) -> Result<Option<RevenueRecord>, StoreError>;
    fn update(&self, record: RevenueRecord) -> Result<(), StoreError>;
    fn delete(&self, id: RecordId) -> Result<(), StoreError>;
    /// Records matching `filter`, unordered.
    fn query(&self, filter: &RevenueFilter) -> Result<Vec<RevenueRecord>, StoreError>;
}

impl<S> RevenueStore for Arc<S>
where
    S: RevenueStore + ?Sized,
{
    fn next_id(&self) -> RecordId {
        (**self).next_id()
    }

    fn insert(&self, record: RevenueRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn get(&self, id: RecordId) -> Result<Option<RevenueRecord>, StoreError> {
        (**self).get(id)
    }

    fn update(&self, record: RevenueRecord) -> Result<(), StoreError> {
        (**self).update(record)
    }

    fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn query(&self, filter: &RevenueFilter) -> Result<Vec<RevenueRecord>, StoreError> {
        (**self).query(filter)
    }
}

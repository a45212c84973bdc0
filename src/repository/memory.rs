//! In-memory user store

use super::{StoreError, UserStore};
use crate::models::user::{Identifier, UserRecord};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<Identifier, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, identifier: &Identifier) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(identifier).map(|entry| entry.value().clone()))
    }

    async fn insert_if_absent(&self, record: UserRecord) -> Result<bool, StoreError> {
        match self.users.entry(record.identifier.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }
}

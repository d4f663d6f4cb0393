//! Member profiles, keyed by display name.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::StoreError;

/// Flat profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub dob: String,
    pub qualification: String,
}

/// Document store holding profiles.
///
/// Records are keyed by `ProfileRecord::name`; `put` overwrites wholesale.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<ProfileRecord>, StoreError>;

    async fn put(&self, record: &ProfileRecord) -> Result<(), StoreError>;

    /// Every stored profile.
    async fn list(&self) -> Result<Vec<ProfileRecord>, StoreError>;
}

/// Process-local profile store, used when no document store is configured.
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    records: Arc<RwLock<BTreeMap<String, ProfileRecord>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, name: &str) -> Result<Option<ProfileRecord>, StoreError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn put(&self, record: &ProfileRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.name.clone(), record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProfileRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

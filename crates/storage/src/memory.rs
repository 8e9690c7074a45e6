//! In-process storage backend.
//!
//! Holds every record behind a single `tokio::sync::RwLock`. Each trait call
//! takes the lock once, so the version check and the write in
//! `update_contract` happen atomically with respect to other callers.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RecordKind, StorageError};
use crate::record::{BlueprintRecord, ContractRecord};
use crate::traits::ContractStorage;

#[derive(Default)]
struct Inner {
    blueprints: Vec<BlueprintRecord>,
    contracts: Vec<ContractRecord>,
}

/// A `ContractStorage` that lives and dies with the process.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(kind: RecordKind, id: &str) -> StorageError {
    StorageError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[async_trait]
impl ContractStorage for MemoryStorage {
    async fn insert_blueprint(&self, record: BlueprintRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if inner.blueprints.iter().any(|b| b.id == record.id) {
            return Err(StorageError::AlreadyExists {
                kind: RecordKind::Blueprint,
                id: record.id,
            });
        }
        tracing::debug!(blueprint_id = %record.id, "blueprint stored");
        inner.blueprints.push(record);
        Ok(())
    }

    async fn get_blueprint(&self, id: &str) -> Result<BlueprintRecord, StorageError> {
        let inner = self.inner.read().await;
        inner
            .blueprints
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| not_found(RecordKind::Blueprint, id))
    }

    async fn list_blueprints(&self) -> Result<Vec<BlueprintRecord>, StorageError> {
        Ok(self.inner.read().await.blueprints.clone())
    }

    async fn delete_blueprint(&self, id: &str) -> Result<BlueprintRecord, StorageError> {
        let mut inner = self.inner.write().await;
        let pos = inner
            .blueprints
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found(RecordKind::Blueprint, id))?;
        Ok(inner.blueprints.remove(pos))
    }

    async fn insert_contract(&self, mut record: ContractRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if inner.contracts.iter().any(|c| c.id == record.id) {
            return Err(StorageError::AlreadyExists {
                kind: RecordKind::Contract,
                id: record.id,
            });
        }
        record.version = 0;
        tracing::debug!(contract_id = %record.id, "contract stored");
        inner.contracts.push(record);
        Ok(())
    }

    async fn get_contract(&self, id: &str) -> Result<ContractRecord, StorageError> {
        let inner = self.inner.read().await;
        inner
            .contracts
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found(RecordKind::Contract, id))
    }

    async fn list_contracts(
        &self,
        status_filter: Option<&str>,
    ) -> Result<Vec<ContractRecord>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .contracts
            .iter()
            .filter(|c| status_filter.is_none_or(|s| c.status == s))
            .cloned()
            .collect())
    }

    async fn update_contract(
        &self,
        mut record: ContractRecord,
        expected_version: i64,
    ) -> Result<i64, StorageError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .contracts
            .iter_mut()
            .find(|c| c.id == record.id)
            .ok_or_else(|| not_found(RecordKind::Contract, &record.id))?;

        if stored.version != expected_version {
            return Err(StorageError::ConcurrentConflict {
                kind: RecordKind::Contract,
                id: record.id,
                expected_version,
            });
        }
        if !record.history.starts_with(&stored.history) {
            return Err(StorageError::HistoryRewrite { id: record.id });
        }

        record.version = stored.version + 1;
        let new_version = record.version;
        *stored = record;
        Ok(new_version)
    }
}

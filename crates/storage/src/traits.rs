use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{BlueprintRecord, ContractRecord};

/// The storage collaborator for contractly.
///
/// A `ContractStorage` implementation is a document store holding blueprint
/// and contract records keyed by id. It knows nothing about the lifecycle
/// rules; it only guarantees the properties the engine builds on.
///
/// ## OCC Conflict Detection
///
/// `update_contract` performs an optimistic concurrency check: the write
/// succeeds only if the stored record's `version` equals `expected_version`,
/// and it bumps the version by one. Otherwise the method returns
/// `Err(StorageError::ConcurrentConflict { ... })` and nothing changes.
///
/// ## Append-only History
///
/// `update_contract` must reject a record whose history does not start with
/// the stored history (`StorageError::HistoryRewrite`).
///
/// ## Referential Integrity
///
/// Deleting a blueprint never touches contracts. Contracts keep their
/// snapshotted fields and an orphaned `blueprint_id`.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait ContractStorage: Send + Sync + 'static {
    // ── Blueprints ────────────────────────────────────────────────────────────

    /// Insert a new blueprint.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` if the id is taken.
    async fn insert_blueprint(&self, record: BlueprintRecord) -> Result<(), StorageError>;

    /// Returns `Err(StorageError::NotFound)` if the blueprint does not exist.
    async fn get_blueprint(&self, id: &str) -> Result<BlueprintRecord, StorageError>;

    /// All blueprints in insertion order.
    async fn list_blueprints(&self) -> Result<Vec<BlueprintRecord>, StorageError>;

    /// Remove a blueprint, returning the removed record.
    ///
    /// Returns `Err(StorageError::NotFound)` if the blueprint does not exist.
    async fn delete_blueprint(&self, id: &str) -> Result<BlueprintRecord, StorageError>;

    // ── Contracts ─────────────────────────────────────────────────────────────

    /// Insert a new contract. The stored version is reset to 0.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` if the id is taken.
    async fn insert_contract(&self, record: ContractRecord) -> Result<(), StorageError>;

    /// Returns `Err(StorageError::NotFound)` if the contract does not exist.
    async fn get_contract(&self, id: &str) -> Result<ContractRecord, StorageError>;

    /// List contracts in insertion order, optionally filtered by status.
    async fn list_contracts(
        &self,
        status_filter: Option<&str>,
    ) -> Result<Vec<ContractRecord>, StorageError>;

    /// Replace a contract if its stored version equals `expected_version`.
    ///
    /// Returns the new version number on success.
    async fn update_contract(
        &self,
        record: ContractRecord,
        expected_version: i64,
    ) -> Result<i64, StorageError>;
}

/// All errors that can be returned by a ContractStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Optimistic concurrency control conflict — another writer modified
    /// the record concurrently. The expected version was not found.
    #[error("concurrent conflict on {kind} {id}: expected version {expected_version}")]
    ConcurrentConflict {
        kind: RecordKind,
        id: String,
        expected_version: i64,
    },

    /// No record with the given id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    /// A record with this id already exists.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: RecordKind, id: String },

    /// The update would drop or alter history entries already stored.
    #[error("history of contract {id} is append-only")]
    HistoryRewrite { id: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Which collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Blueprint,
    Contract,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Blueprint => f.write_str("blueprint"),
            RecordKind::Contract => f.write_str("contract"),
        }
    }
}

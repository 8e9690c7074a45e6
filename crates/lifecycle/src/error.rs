use contractly_core::{CoreError, Status};
use contractly_storage::{RecordKind, StorageError};

/// Typed rejection returned by every engine operation.
///
/// All variants are produced before any write is attempted, except
/// `Conflict`, which reports a lost compare-and-swap; in both cases nothing
/// has been committed.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("contract is in terminal state {status}; cannot move to {requested}")]
    TerminalState { status: Status, requested: String },

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: Status, to: String },

    #[error("{operation} is not permitted while contract is {status}")]
    InvalidState {
        operation: &'static str,
        status: Status,
    },

    #[error("field shape mismatch: expected {expected} values, got {actual} ({detail})")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        detail: String,
    },

    /// Another writer updated the contract between our read and our write.
    #[error("contract {id} was modified concurrently (expected version {expected_version})")]
    Conflict { id: String, expected_version: i64 },

    /// Approval requires a ticked terms-acceptance checkbox.
    #[error("contract {contract_id} cannot be approved until terms are accepted")]
    TermsNotAccepted { contract_id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl LifecycleError {
    /// Stable machine-readable token for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleError::NotFound { .. } => "not_found",
            LifecycleError::TerminalState { .. } => "terminal_state",
            LifecycleError::InvalidTransition { .. } => "invalid_transition",
            LifecycleError::InvalidState { .. } => "invalid_state",
            LifecycleError::ShapeMismatch { .. } => "shape_mismatch",
            LifecycleError::Conflict { .. } => "conflict",
            LifecycleError::TermsNotAccepted { .. } => "terms_not_accepted",
            LifecycleError::InvalidInput(_) => "invalid_input",
            LifecycleError::Storage(_) => "storage",
        }
    }

    /// Current status of the contract, when the rejection depends on it.
    pub fn current_status(&self) -> Option<Status> {
        match self {
            LifecycleError::TerminalState { status, .. } => Some(*status),
            LifecycleError::InvalidTransition { from, .. } => Some(*from),
            LifecycleError::InvalidState { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The status token the caller asked for, when applicable.
    pub fn requested_status(&self) -> Option<&str> {
        match self {
            LifecycleError::TerminalState { requested, .. } => Some(requested.as_str()),
            LifecycleError::InvalidTransition { to, .. } => Some(to.as_str()),
            _ => None,
        }
    }
}

impl From<StorageError> for LifecycleError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { kind, id } => LifecycleError::NotFound { kind, id },
            StorageError::ConcurrentConflict {
                kind: RecordKind::Contract,
                id,
                expected_version,
            } => LifecycleError::Conflict {
                id,
                expected_version,
            },
            other => LifecycleError::Storage(other),
        }
    }
}

impl From<CoreError> for LifecycleError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::TerminalState { status, requested } => {
                LifecycleError::TerminalState { status, requested }
            }
            CoreError::InvalidTransition { from, to } => {
                LifecycleError::InvalidTransition { from, to }
            }
            CoreError::InvalidState { operation, status } => {
                LifecycleError::InvalidState { operation, status }
            }
            CoreError::ShapeMismatch {
                expected,
                actual,
                detail,
            } => LifecycleError::ShapeMismatch {
                expected,
                actual,
                detail,
            },
            other @ (CoreError::UnknownFieldType(_) | CoreError::UnknownStatus(_)) => {
                LifecycleError::InvalidInput(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_conflict_maps_to_conflict() {
        let err: LifecycleError = StorageError::ConcurrentConflict {
            kind: RecordKind::Contract,
            id: "c-1".to_string(),
            expected_version: 3,
        }
        .into();
        assert_eq!(err.kind(), "conflict");
        assert!(matches!(
            err,
            LifecycleError::Conflict {
                expected_version: 3,
                ..
            }
        ));
    }

    #[test]
    fn storage_not_found_keeps_kind() {
        let err: LifecycleError = StorageError::NotFound {
            kind: RecordKind::Blueprint,
            id: "bp-9".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "blueprint not found: bp-9");
    }

    #[test]
    fn rejection_context_is_preserved() {
        let err: LifecycleError = CoreError::InvalidTransition {
            from: Status::Approved,
            to: "Approved".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "invalid_transition");
        assert_eq!(err.current_status(), Some(Status::Approved));
        assert_eq!(err.requested_status(), Some("Approved"));
    }
}

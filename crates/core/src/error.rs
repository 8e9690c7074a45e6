use crate::status::Status;

/// Rejections produced by the pure domain rules.
///
/// Every variant carries enough context (current status, requested status,
/// offending counts) for a caller to render an actionable message without
/// re-reading the contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Supplied field values do not line up with the blueprint's fields.
    #[error("field shape mismatch: expected {expected} values, got {actual} ({detail})")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        detail: String,
    },

    /// The requested status is not an allowed destination of the current one.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: Status, to: String },

    /// The contract is Locked or Revoked and can no longer change.
    #[error("contract is in terminal state {status}; cannot move to {requested}")]
    TerminalState { status: Status, requested: String },

    /// An operation was attempted outside the status it is permitted in.
    #[error("{operation} is not permitted while contract is {status}")]
    InvalidState {
        operation: &'static str,
        status: Status,
    },

    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),
}

//! contractly-core: the document-contract domain model.
//!
//! Pure types and rules with no I/O:
//!
//! - [`Status`] and the closed lifecycle table ([`VALID_TRANSITIONS`])
//! - [`Blueprint`] templates made of [`FieldDefinition`]s
//! - [`Contract`] instances with bound field snapshots and history
//! - [`CoreError`] for every rejection the rules can produce
//!
//! Storage and orchestration live in `contractly-storage` and
//! `contractly-lifecycle`.

pub mod blueprint;
pub mod contract;
pub mod error;
pub mod field;
pub mod status;

pub use blueprint::{lint_blueprint, Blueprint, LintWarning};
pub use contract::{Contract, HistoryEntry, CREATED_ACTION};
pub use error::CoreError;
pub use field::{
    bind_fields, is_truthy, BoundField, FieldDefinition, FieldDraft, FieldType, FieldValues,
    Position,
};
pub use status::{validate_transition, Status, VALID_TRANSITIONS};

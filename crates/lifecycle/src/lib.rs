//! contractly-lifecycle: the contract lifecycle engine.
//!
//! [`LifecycleEngine`] exposes the boundary operations (blueprint authoring,
//! contract instantiation, rename, status transitions) over any
//! [`ContractStorage`](contractly_storage::ContractStorage) backend. It is
//! the sole authority for status mutation.

mod convert;
pub mod engine;
pub mod error;

pub use engine::{AvailableTransitions, ContractView, EngineConfig, LifecycleEngine};
pub use error::LifecycleError;

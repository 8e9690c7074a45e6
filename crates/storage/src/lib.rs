pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::{RecordKind, StorageError};
pub use memory::MemoryStorage;
pub use record::{BlueprintRecord, BoundFieldRecord, ContractRecord, FieldRecord, HistoryRecord};
pub use traits::ContractStorage;

use serde::{Deserialize, Serialize};

/// A field definition as stored inside a blueprint or contract document.
///
/// `kind` holds the field type token (`"Text"`, `"Checkbox"`, ...); the
/// store does not interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub placeholder: String,
    pub input_type: String,
    pub position: Option<(f64, f64)>,
}

/// A stored blueprint document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintRecord {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldRecord>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
}

/// One field of a contract's snapshot: the definition copied at creation
/// time plus the value bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundFieldRecord {
    pub field: FieldRecord,
    pub value: serde_json::Value,
}

/// One entry of a contract's append-only history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub status: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub timestamp: String,
    pub action: String,
}

/// A stored contract document with its embedded field snapshot and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub id: String,
    pub blueprint_id: String,
    pub name: String,
    pub status: String,
    pub fields: Vec<BoundFieldRecord>,
    pub history: Vec<HistoryRecord>,
    /// Revision used for compare-and-swap; 0 on insert, +1 per update.
    pub version: i64,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}

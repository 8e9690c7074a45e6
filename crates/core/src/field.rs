//! Field definitions and field-value binding.
//!
//! Values are bound to definitions by each field's stable `id`, never by
//! array position alone. A positional input is accepted only when its
//! length equals the blueprint's field count.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Date,
    Signature,
    Checkbox,
    Details,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Date => "Date",
            FieldType::Signature => "Signature",
            FieldType::Checkbox => "Checkbox",
            FieldType::Details => "Details",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Text" => Ok(FieldType::Text),
            "Date" => Ok(FieldType::Date),
            "Signature" => Ok(FieldType::Signature),
            "Checkbox" => Ok(FieldType::Checkbox),
            "Details" => Ok(FieldType::Details),
            other => Err(CoreError::UnknownFieldType(other.to_string())),
        }
    }
}

/// Layout hint from the blueprint editor. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Stable identifier assigned when the blueprint is authored.
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub input_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Authoring input for a field. The id is optional; a missing one is
/// assigned when the blueprint is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub input_type: String,
    #[serde(default)]
    pub position: Option<Position>,
}

impl FieldDraft {
    pub fn into_definition(self, assign_id: impl FnOnce() -> String) -> FieldDefinition {
        FieldDefinition {
            id: self.id.filter(|id| !id.is_empty()).unwrap_or_else(assign_id),
            field_type: self.field_type,
            label: self.label,
            placeholder: self.placeholder,
            input_type: self.input_type,
            position: self.position,
        }
    }
}

/// A field definition snapshotted into a contract together with its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundField {
    pub field_id: String,
    pub definition: FieldDefinition,
    pub value: serde_json::Value,
}

/// Caller-supplied values for a new contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValues {
    /// One value per blueprint field, in blueprint order.
    Positional(Vec<serde_json::Value>),
    /// Values keyed by field id; must cover exactly the blueprint's fields.
    Keyed(BTreeMap<String, serde_json::Value>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Positional(values) => values.len(),
            FieldValues::Keyed(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FieldValues {
    fn default() -> Self {
        FieldValues::Positional(Vec::new())
    }
}

/// Reject definitions with empty or duplicate ids.
pub fn check_field_ids(fields: &[FieldDefinition]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.id.is_empty() {
            return Err(CoreError::ShapeMismatch {
                expected: fields.len(),
                actual: fields.len(),
                detail: format!("field '{}' has an empty id", field.label),
            });
        }
        if !seen.insert(field.id.as_str()) {
            return Err(CoreError::ShapeMismatch {
                expected: fields.len(),
                actual: fields.len(),
                detail: format!("duplicate field id '{}'", field.id),
            });
        }
    }
    Ok(())
}

/// Snapshot `fields` and attach `values` to them.
///
/// Never pads, truncates, or zips unequal sequences: any count or key
/// mismatch is a `ShapeMismatch`.
pub fn bind_fields(
    fields: &[FieldDefinition],
    values: FieldValues,
) -> Result<Vec<BoundField>, CoreError> {
    let expected = fields.len();
    let actual = values.len();
    match values {
        FieldValues::Positional(values) => {
            if expected != actual {
                return Err(CoreError::ShapeMismatch {
                    expected,
                    actual,
                    detail: "positional value count differs from field count".to_string(),
                });
            }
            Ok(fields
                .iter()
                .zip(values)
                .map(|(definition, value)| BoundField {
                    field_id: definition.id.clone(),
                    definition: definition.clone(),
                    value,
                })
                .collect())
        }
        FieldValues::Keyed(mut values) => {
            let mut bound = Vec::with_capacity(expected);
            for definition in fields {
                let value = values
                    .remove(&definition.id)
                    .ok_or_else(|| CoreError::ShapeMismatch {
                        expected,
                        actual,
                        detail: format!("missing value for field '{}'", definition.id),
                    })?;
                bound.push(BoundField {
                    field_id: definition.id.clone(),
                    definition: definition.clone(),
                    value,
                });
            }
            if let Some(unknown) = values.keys().next() {
                return Err(CoreError::ShapeMismatch {
                    expected,
                    actual,
                    detail: format!("unknown field id '{}'", unknown),
                });
            }
            Ok(bound)
        }
    }
}

/// Loose truthiness used for checkbox values captured from forms.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => {
            matches!(s.to_ascii_lowercase().as_str(), "true" | "on" | "yes")
        }
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

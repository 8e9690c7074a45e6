//! Reusable document templates.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::{check_field_ids, FieldDefinition, FieldType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl Blueprint {
    /// Build a blueprint after structural checks on its field ids.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<FieldDefinition>,
        created_at: impl Into<String>,
    ) -> Result<Self, CoreError> {
        check_field_ids(&fields)?;
        Ok(Blueprint {
            id: id.into(),
            name: name.into(),
            fields,
            created_at: created_at.into(),
        })
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn checkbox_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Checkbox)
            .count()
    }
}

/// An authoring-time finding. Advisory only; the engine never rejects a
/// blueprint because of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub message: String,
}

/// Check the authoring rules the editor is expected to enforce: a non-empty
/// name, labelled fields, and exactly one terms-acceptance checkbox.
pub fn lint_blueprint(name: &str, fields: &[FieldDefinition]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    if name.trim().is_empty() {
        warnings.push(LintWarning {
            field_id: None,
            message: "blueprint name is empty".to_string(),
        });
    }
    if fields.is_empty() {
        warnings.push(LintWarning {
            field_id: None,
            message: "blueprint has no fields".to_string(),
        });
    }
    for field in fields {
        if field.label.trim().is_empty() {
            warnings.push(LintWarning {
                field_id: Some(field.id.clone()),
                message: format!("{} field has an empty label", field.field_type),
            });
        }
    }

    let checkboxes = fields
        .iter()
        .filter(|f| f.field_type == FieldType::Checkbox)
        .count();
    if checkboxes != 1 {
        warnings.push(LintWarning {
            field_id: None,
            message: format!(
                "expected exactly one terms-acceptance Checkbox field, found {}",
                checkboxes
            ),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str, field_type: FieldType, label: &str) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            field_type,
            label: label.to_string(),
            placeholder: String::new(),
            input_type: String::new(),
            position: None,
        }
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let fields = vec![
            field("x", FieldType::Text, "A"),
            field("x", FieldType::Checkbox, "B"),
        ];
        assert!(Blueprint::new("bp", "NDA", fields, "2026-01-01T00:00:00Z").is_err());
    }

    #[test]
    fn well_formed_blueprint_lints_clean() {
        let fields = vec![
            field("party", FieldType::Text, "Party Name"),
            field("terms", FieldType::Checkbox, "Terms"),
        ];
        assert!(lint_blueprint("NDA", &fields).is_empty());
        let bp = Blueprint::new("bp", "NDA", fields, "2026-01-01T00:00:00Z").unwrap();
        assert_eq!(bp.checkbox_count(), 1);
        assert_eq!(bp.field("party").map(|f| f.label.as_str()), Some("Party Name"));
    }

    #[test]
    fn lint_flags_missing_terms_and_empty_labels() {
        let fields = vec![field("party", FieldType::Text, " ")];
        let warnings = lint_blueprint("", &fields);
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .any(|w| w.field_id.as_deref() == Some("party")));
        assert!(warnings.iter().any(|w| w.message.contains("found 0")));
    }

    #[test]
    fn lint_flags_two_checkboxes() {
        let fields = vec![
            field("a", FieldType::Checkbox, "Terms"),
            field("b", FieldType::Checkbox, "Privacy"),
        ];
        let warnings = lint_blueprint("Lease", &fields);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("found 2"));
    }
}

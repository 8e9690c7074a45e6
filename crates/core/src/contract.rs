//! Contract instances and the pure lifecycle rules applied to them.
//!
//! Every mutation here is copy-on-write: the input contract is never
//! touched, and a rejected request yields an error with no partial state.

use serde::{Deserialize, Serialize};

use crate::blueprint::Blueprint;
use crate::error::CoreError;
use crate::field::{bind_fields, is_truthy, BoundField, FieldType, FieldValues};
use crate::status::{validate_transition, Status};

/// Action text of the entry recorded when a contract is instantiated.
pub const CREATED_ACTION: &str = "Contract Instance Created";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: Status,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    /// Non-owning reference; the blueprint may since have been deleted.
    pub blueprint_id: String,
    pub name: String,
    pub status: Status,
    pub fields: Vec<BoundField>,
    pub history: Vec<HistoryEntry>,
    /// Optimistic-concurrency revision, bumped by the store on every write.
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Contract {
    /// Bind a new contract to `blueprint`, snapshotting its field definitions.
    pub fn instantiate(
        id: impl Into<String>,
        blueprint: &Blueprint,
        name: impl Into<String>,
        values: FieldValues,
        now: &str,
    ) -> Result<Self, CoreError> {
        let fields = bind_fields(&blueprint.fields, values)?;
        Ok(Contract {
            id: id.into(),
            blueprint_id: blueprint.id.clone(),
            name: name.into(),
            status: Status::Created,
            fields,
            history: vec![HistoryEntry {
                status: Status::Created,
                timestamp: now.to_string(),
                action: CREATED_ACTION.to_string(),
            }],
            version: 0,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    /// Return a copy moved to `requested`, with one history entry appended.
    ///
    /// The prior status is captured before anything changes so the audit
    /// text always reads "Moved from <prior> to <next>".
    pub fn with_transition(&self, requested: &str, now: &str) -> Result<Self, CoreError> {
        let prior = self.status;
        let next = validate_transition(prior, requested)?;

        let mut updated = self.clone();
        updated.status = next;
        updated.history.push(HistoryEntry {
            status: next,
            timestamp: now.to_string(),
            action: format!("Moved from {} to {}", prior, next),
        });
        updated.updated_at = now.to_string();
        Ok(updated)
    }

    /// Return a renamed copy. Only permitted while the contract is Created.
    pub fn renamed(&self, name: impl Into<String>, now: &str) -> Result<Self, CoreError> {
        if self.status != Status::Created {
            return Err(CoreError::InvalidState {
                operation: "rename",
                status: self.status,
            });
        }
        let mut updated = self.clone();
        updated.name = name.into();
        updated.updated_at = now.to_string();
        Ok(updated)
    }

    /// True when some Checkbox field carries a truthy value.
    pub fn terms_accepted(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.definition.field_type == FieldType::Checkbox && is_truthy(&f.value))
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn available_transitions(&self) -> Vec<Status> {
        self.status.allowed_transitions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use serde_json::json;

    const T0: &str = "2026-01-01T00:00:00Z";
    const T1: &str = "2026-01-02T00:00:00Z";

    fn nda() -> Blueprint {
        let fields = vec![
            FieldDefinition {
                id: "party".to_string(),
                field_type: FieldType::Text,
                label: "Party Name".to_string(),
                placeholder: "e.g., Full Legal Name".to_string(),
                input_type: "text".to_string(),
                position: None,
            },
            FieldDefinition {
                id: "terms".to_string(),
                field_type: FieldType::Checkbox,
                label: "Terms".to_string(),
                placeholder: String::new(),
                input_type: "checkbox".to_string(),
                position: None,
            },
        ];
        Blueprint::new("bp-1", "NDA", fields, T0).unwrap()
    }

    fn created() -> Contract {
        Contract::instantiate(
            "c-1",
            &nda(),
            "Acme NDA",
            FieldValues::Positional(vec![json!("Acme Corp"), json!(true)]),
            T0,
        )
        .unwrap()
    }

    #[test]
    fn instantiate_records_initial_history() {
        let contract = created();
        assert_eq!(contract.status, Status::Created);
        assert_eq!(contract.history.len(), 1);
        assert_eq!(contract.history[0].status, Status::Created);
        assert_eq!(contract.history[0].action, CREATED_ACTION);
        assert_eq!(contract.fields.len(), 2);
        assert_eq!(contract.fields[0].value, json!("Acme Corp"));
        assert_eq!(contract.blueprint_id, "bp-1");
        assert_eq!(contract.version, 0);
    }

    #[test]
    fn instantiate_rejects_shape_mismatch() {
        let err = Contract::instantiate(
            "c-1",
            &nda(),
            "Acme",
            FieldValues::Positional(vec![json!("Acme")]),
            T0,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn snapshot_is_independent_of_blueprint_edits() {
        let mut blueprint = nda();
        let contract = Contract::instantiate(
            "c-1",
            &blueprint,
            "Acme",
            FieldValues::Positional(vec![json!("Acme Corp"), json!(true)]),
            T0,
        )
        .unwrap();
        blueprint.fields.reverse();
        blueprint.fields[0].label = "Changed".to_string();
        assert_eq!(contract.fields[0].definition.label, "Party Name");
        assert_eq!(contract.fields[1].definition.label, "Terms");
    }

    #[test]
    fn transition_appends_history_with_prior_status() {
        let contract = created();
        let approved = contract.with_transition("Approved", T1).unwrap();
        assert_eq!(approved.status, Status::Approved);
        assert_eq!(approved.history.len(), 2);
        let last = approved.history.last().unwrap();
        assert_eq!(last.status, Status::Approved);
        assert_eq!(last.action, "Moved from Created to Approved");
        assert_eq!(last.timestamp, T1);
        assert_eq!(approved.updated_at, T1);
        // input untouched
        assert_eq!(contract.status, Status::Created);
        assert_eq!(contract.history.len(), 1);
    }

    #[test]
    fn full_chain_then_terminal() {
        let mut contract = created();
        for next in ["Approved", "Sent", "Signed", "Locked"] {
            contract = contract.with_transition(next, T1).unwrap();
        }
        assert_eq!(contract.status, Status::Locked);
        assert_eq!(contract.history.len(), 5);
        let err = contract.with_transition("Approved", T1).unwrap_err();
        assert!(matches!(err, CoreError::TerminalState { .. }));
    }

    #[test]
    fn revoke_from_created_is_terminal() {
        let revoked = created().with_transition("Revoked", T1).unwrap();
        assert!(revoked.is_terminal());
        assert!(revoked.available_transitions().is_empty());
        for next in Status::ALL {
            let err = revoked.with_transition(next.as_str(), T1).unwrap_err();
            assert!(matches!(err, CoreError::TerminalState { .. }));
        }
    }

    #[test]
    fn rename_only_while_created() {
        let contract = created();
        let renamed = contract.renamed("Acme NDA v2", T1).unwrap();
        assert_eq!(renamed.name, "Acme NDA v2");
        assert_eq!(renamed.history.len(), 1);

        let approved = contract.with_transition("Approved", T1).unwrap();
        let err = approved.renamed("nope", T1).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidState {
                operation: "rename",
                status: Status::Approved
            }
        );
    }

    #[test]
    fn terms_accepted_reads_checkbox_value() {
        assert!(created().terms_accepted());
        let unticked = Contract::instantiate(
            "c-2",
            &nda(),
            "Acme",
            FieldValues::Positional(vec![json!("Acme"), json!(false)]),
            T0,
        )
        .unwrap();
        assert!(!unticked.terms_accepted());
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(created()).unwrap();
        assert_eq!(value["blueprintId"], json!("bp-1"));
        assert_eq!(value["status"], json!("Created"));
        assert_eq!(value["fields"][0]["fieldId"], json!("party"));
        assert_eq!(value["fields"][0]["definition"]["type"], json!("Text"));
        assert_eq!(value["history"][0]["action"], json!(CREATED_ACTION));
    }
}

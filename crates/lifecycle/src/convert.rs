//! Conversion between domain types and the store's plain records.
//!
//! Records carry status and field-type tokens as strings. Reading a token the
//! domain does not know is a backend fault, not a caller error.

use contractly_core::{
    Blueprint, BoundField, Contract, FieldDefinition, HistoryEntry, Position, Status,
};
use contractly_storage::{
    BlueprintRecord, BoundFieldRecord, ContractRecord, FieldRecord, HistoryRecord, StorageError,
};

fn corrupt(id: &str, detail: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(format!("record {id} is unreadable: {detail}"))
}

pub(crate) fn field_to_record(field: &FieldDefinition) -> FieldRecord {
    FieldRecord {
        id: field.id.clone(),
        kind: field.field_type.as_str().to_string(),
        label: field.label.clone(),
        placeholder: field.placeholder.clone(),
        input_type: field.input_type.clone(),
        position: field.position.map(|p| (p.x, p.y)),
    }
}

fn field_from_record(owner: &str, record: FieldRecord) -> Result<FieldDefinition, StorageError> {
    Ok(FieldDefinition {
        field_type: record.kind.parse().map_err(|e| corrupt(owner, e))?,
        id: record.id,
        label: record.label,
        placeholder: record.placeholder,
        input_type: record.input_type,
        position: record.position.map(|(x, y)| Position { x, y }),
    })
}

pub(crate) fn blueprint_to_record(blueprint: &Blueprint) -> BlueprintRecord {
    BlueprintRecord {
        id: blueprint.id.clone(),
        name: blueprint.name.clone(),
        fields: blueprint.fields.iter().map(field_to_record).collect(),
        created_at: blueprint.created_at.clone(),
    }
}

pub(crate) fn blueprint_from_record(record: BlueprintRecord) -> Result<Blueprint, StorageError> {
    let id = record.id;
    let fields = record
        .fields
        .into_iter()
        .map(|f| field_from_record(&id, f))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Blueprint {
        id,
        name: record.name,
        fields,
        created_at: record.created_at,
    })
}

pub(crate) fn contract_to_record(contract: &Contract) -> ContractRecord {
    ContractRecord {
        id: contract.id.clone(),
        blueprint_id: contract.blueprint_id.clone(),
        name: contract.name.clone(),
        status: contract.status.as_str().to_string(),
        fields: contract
            .fields
            .iter()
            .map(|f| BoundFieldRecord {
                field: field_to_record(&f.definition),
                value: f.value.clone(),
            })
            .collect(),
        history: contract
            .history
            .iter()
            .map(|h| HistoryRecord {
                status: h.status.as_str().to_string(),
                timestamp: h.timestamp.clone(),
                action: h.action.clone(),
            })
            .collect(),
        version: contract.version,
        created_at: contract.created_at.clone(),
        updated_at: contract.updated_at.clone(),
    }
}

fn parse_status(owner: &str, token: &str) -> Result<Status, StorageError> {
    token.parse().map_err(|e| corrupt(owner, e))
}

pub(crate) fn contract_from_record(record: ContractRecord) -> Result<Contract, StorageError> {
    let id = record.id;
    let status = parse_status(&id, &record.status)?;
    let fields = record
        .fields
        .into_iter()
        .map(|f| {
            let definition = field_from_record(&id, f.field)?;
            Ok(BoundField {
                field_id: definition.id.clone(),
                definition,
                value: f.value,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;
    let history = record
        .history
        .into_iter()
        .map(|h| {
            Ok(HistoryEntry {
                status: parse_status(&id, &h.status)?,
                timestamp: h.timestamp,
                action: h.action,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    Ok(Contract {
        id,
        blueprint_id: record.blueprint_id,
        name: record.name,
        status,
        fields,
        history,
        version: record.version,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractly_core::{FieldType, FieldValues};
    use serde_json::json;

    fn blueprint() -> Blueprint {
        Blueprint::new(
            "bp-1",
            "NDA",
            vec![
                FieldDefinition {
                    id: "party".to_string(),
                    field_type: FieldType::Text,
                    label: "Party Name".to_string(),
                    placeholder: "e.g., Full Legal Name".to_string(),
                    input_type: "text".to_string(),
                    position: Some(Position { x: 4.0, y: 8.0 }),
                },
                FieldDefinition {
                    id: "terms".to_string(),
                    field_type: FieldType::Checkbox,
                    label: "Terms".to_string(),
                    placeholder: String::new(),
                    input_type: "checkbox".to_string(),
                    position: None,
                },
            ],
            "2026-01-01T00:00:00Z",
        )
        .unwrap()
    }

    #[test]
    fn blueprint_survives_the_store() {
        let bp = blueprint();
        let back = blueprint_from_record(blueprint_to_record(&bp)).unwrap();
        assert_eq!(back, bp);
    }

    #[test]
    fn contract_survives_the_store() {
        let contract = Contract::instantiate(
            "c-1",
            &blueprint(),
            "Acme NDA",
            FieldValues::Positional(vec![json!("Acme Corp"), json!(true)]),
            "2026-01-01T00:00:00Z",
        )
        .unwrap()
        .with_transition("Approved", "2026-01-02T00:00:00Z")
        .unwrap();
        let back = contract_from_record(contract_to_record(&contract)).unwrap();
        assert_eq!(back, contract);
    }

    #[test]
    fn unknown_field_type_is_backend_fault() {
        let mut record = blueprint_to_record(&blueprint());
        record.fields[0].kind = "Hologram".to_string();
        let err = blueprint_from_record(record).unwrap_err();
        assert!(matches!(err, StorageError::Backend(msg) if msg.contains("Hologram")));
    }
}

//! The lifecycle engine: the only component that mutates contracts.
//!
//! Every mutating operation follows the same shape:
//! 1. Load the current record (its `version` is the read revision)
//! 2. Apply the pure domain rule to get a new value, or reject
//! 3. Write back with compare-and-swap on the read revision
//!
//! Step 2 never touches the store, so a rejection leaves nothing behind.
//! Step 3 fails with `Conflict` when another writer got there first; the
//! engine never retries on its own.

use std::sync::Arc;

use contractly_core::{Blueprint, Contract, FieldDraft, FieldValues, Status};
use contractly_storage::ContractStorage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::convert::{
    blueprint_from_record, blueprint_to_record, contract_from_record, contract_to_record,
};
use crate::error::LifecycleError;

/// Engine policy switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Refuse `Created -> Approved` unless a Checkbox field is ticked.
    pub require_terms_acceptance: bool,
}

/// A contract together with the blueprint it was created from, if that
/// blueprint still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractView {
    pub contract: Contract,
    pub blueprint: Option<Blueprint>,
}

/// The moves currently open to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTransitions {
    pub contract_id: String,
    pub status: Status,
    pub terminal: bool,
    pub next: Vec<Status>,
}

pub struct LifecycleEngine<S> {
    storage: Arc<S>,
    config: EngineConfig,
}

impl<S> Clone for LifecycleEngine<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            config: self.config.clone(),
        }
    }
}

/// RFC 3339 UTC timestamp for history entries and record metadata.
pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn required_name(name: &str) -> Result<String, LifecycleError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LifecycleError::InvalidInput(
            "contract name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl<S: ContractStorage> LifecycleEngine<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    pub fn with_config(storage: Arc<S>, config: EngineConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    // ── Blueprints ────────────────────────────────────────────────────────────

    /// Store a new blueprint. Fields without an id get a fresh one.
    pub async fn create_blueprint(
        &self,
        name: &str,
        fields: Vec<FieldDraft>,
    ) -> Result<Blueprint, LifecycleError> {
        let fields = fields
            .into_iter()
            .map(|draft| draft.into_definition(new_id))
            .collect();
        let blueprint = Blueprint::new(new_id(), name, fields, now_rfc3339())?;
        self.storage
            .insert_blueprint(blueprint_to_record(&blueprint))
            .await?;
        info!(
            blueprint_id = %blueprint.id,
            name = %blueprint.name,
            fields = blueprint.fields.len(),
            "blueprint created"
        );
        Ok(blueprint)
    }

    pub async fn list_blueprints(&self) -> Result<Vec<Blueprint>, LifecycleError> {
        let records = self.storage.list_blueprints().await?;
        Ok(records
            .into_iter()
            .map(blueprint_from_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn get_blueprint(&self, blueprint_id: &str) -> Result<Blueprint, LifecycleError> {
        let record = self.storage.get_blueprint(blueprint_id).await?;
        Ok(blueprint_from_record(record)?)
    }

    /// Remove a blueprint. Contracts created from it keep their snapshot.
    pub async fn delete_blueprint(&self, blueprint_id: &str) -> Result<Blueprint, LifecycleError> {
        let record = self.storage.delete_blueprint(blueprint_id).await?;
        info!(blueprint_id, "blueprint deleted");
        Ok(blueprint_from_record(record)?)
    }

    // ── Contracts ─────────────────────────────────────────────────────────────

    /// Instantiate a contract from a blueprint, starting at `Created`.
    pub async fn create_contract(
        &self,
        blueprint_id: &str,
        name: &str,
        values: FieldValues,
    ) -> Result<Contract, LifecycleError> {
        let name = required_name(name)?;
        let blueprint = self.get_blueprint(blueprint_id).await?;
        let contract = Contract::instantiate(new_id(), &blueprint, name, values, &now_rfc3339())
            .inspect_err(|e| warn!(blueprint_id, error = %e, "contract creation rejected"))?;
        self.storage
            .insert_contract(contract_to_record(&contract))
            .await?;
        info!(
            contract_id = %contract.id,
            blueprint_id,
            "contract created"
        );
        Ok(contract)
    }

    pub async fn get_contract(&self, contract_id: &str) -> Result<Contract, LifecycleError> {
        let record = self.storage.get_contract(contract_id).await?;
        debug!(contract_id, version = record.version, "contract loaded");
        Ok(contract_from_record(record)?)
    }

    pub async fn list_contracts(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<Contract>, LifecycleError> {
        let records = self
            .storage
            .list_contracts(status.map(Status::as_str))
            .await?;
        Ok(records
            .into_iter()
            .map(contract_from_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Like [`list_contracts`](Self::list_contracts), joined with each
    /// contract's blueprint. Deleted blueprints come back as `None`.
    pub async fn list_contract_views(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<ContractView>, LifecycleError> {
        let blueprints = self.list_blueprints().await?;
        let contracts = self.list_contracts(status).await?;
        Ok(contracts
            .into_iter()
            .map(|contract| {
                let blueprint = blueprints
                    .iter()
                    .find(|b| b.id == contract.blueprint_id)
                    .cloned();
                ContractView {
                    contract,
                    blueprint,
                }
            })
            .collect())
    }

    /// Rename a contract. Only permitted while it is `Created`.
    pub async fn rename_contract(
        &self,
        contract_id: &str,
        new_name: &str,
    ) -> Result<Contract, LifecycleError> {
        let new_name = required_name(new_name)?;
        let current = self.get_contract(contract_id).await?;
        let renamed = current
            .renamed(new_name, &now_rfc3339())
            .inspect_err(|e| warn!(contract_id, error = %e, "rename rejected"))?;
        let saved = self.save(renamed, current.version).await?;
        info!(
            contract_id,
            from = %current.name,
            to = %saved.name,
            "contract renamed"
        );
        Ok(saved)
    }

    /// Move a contract to `next_status`.
    ///
    /// `next_status` is the raw token the caller sent; anything that is not
    /// an allowed destination (including unknown names and the current
    /// status itself) is an `InvalidTransition`.
    pub async fn request_transition(
        &self,
        contract_id: &str,
        next_status: &str,
    ) -> Result<Contract, LifecycleError> {
        let current = self.get_contract(contract_id).await?;
        let updated = current
            .with_transition(next_status, &now_rfc3339())
            .inspect_err(|e| {
                warn!(
                    contract_id,
                    status = %current.status,
                    requested = next_status,
                    error = %e,
                    "transition rejected"
                )
            })?;

        if self.config.require_terms_acceptance
            && updated.status == Status::Approved
            && !current.terms_accepted()
        {
            warn!(contract_id, "approval rejected: terms not accepted");
            return Err(LifecycleError::TermsNotAccepted {
                contract_id: contract_id.to_string(),
            });
        }

        let saved = self.save(updated, current.version).await?;
        info!(
            contract_id,
            from = %current.status,
            to = %saved.status,
            version = saved.version,
            "contract transitioned"
        );
        Ok(saved)
    }

    /// Typed convenience over [`request_transition`](Self::request_transition).
    pub async fn transition(
        &self,
        contract_id: &str,
        next: Status,
    ) -> Result<Contract, LifecycleError> {
        self.request_transition(contract_id, next.as_str()).await
    }

    pub async fn available_transitions(
        &self,
        contract_id: &str,
    ) -> Result<AvailableTransitions, LifecycleError> {
        let contract = self.get_contract(contract_id).await?;
        Ok(AvailableTransitions {
            next: contract.available_transitions(),
            terminal: contract.is_terminal(),
            status: contract.status,
            contract_id: contract.id,
        })
    }

    /// Compare-and-swap write of `contract` against the revision it was read at.
    async fn save(
        &self,
        mut contract: Contract,
        expected_version: i64,
    ) -> Result<Contract, LifecycleError> {
        let record = contract_to_record(&contract);
        match self.storage.update_contract(record, expected_version).await {
            Ok(version) => {
                contract.version = version;
                Ok(contract)
            }
            Err(e) => {
                let err = LifecycleError::from(e);
                if let LifecycleError::Conflict { .. } = err {
                    warn!(contract_id = %contract.id, expected_version, "lost concurrent update");
                }
                Err(err)
            }
        }
    }
}

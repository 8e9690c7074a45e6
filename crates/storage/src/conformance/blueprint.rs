use std::future::Future;

use super::{make_blueprint, make_contract, TestResult};
use crate::{ContractStorage, RecordKind, StorageError};

pub(super) async fn run_blueprint_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "blueprint",
            "insert_then_get_blueprint",
            insert_then_get_blueprint(factory).await,
        ),
        TestResult::from_result(
            "blueprint",
            "duplicate_blueprint_rejected",
            duplicate_blueprint_rejected(factory).await,
        ),
        TestResult::from_result(
            "blueprint",
            "list_blueprints_in_insertion_order",
            list_blueprints_in_insertion_order(factory).await,
        ),
        TestResult::from_result(
            "blueprint",
            "delete_removes_blueprint",
            delete_removes_blueprint(factory).await,
        ),
        TestResult::from_result(
            "blueprint",
            "delete_missing_blueprint_not_found",
            delete_missing_blueprint_not_found(factory).await,
        ),
        TestResult::from_result(
            "blueprint",
            "delete_leaves_referencing_contracts",
            delete_leaves_referencing_contracts(factory).await,
        ),
    ]
}

async fn insert_then_get_blueprint<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let record = make_blueprint("bp-1", "NDA");
    storage
        .insert_blueprint(record.clone())
        .await
        .map_err(|e| format!("insert: {e}"))?;
    let got = storage
        .get_blueprint("bp-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if got != record {
        return Err(format!("stored blueprint differs: {got:?}"));
    }
    Ok(())
}

async fn duplicate_blueprint_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    storage
        .insert_blueprint(make_blueprint("bp-1", "NDA"))
        .await
        .map_err(|e| format!("insert: {e}"))?;
    match storage.insert_blueprint(make_blueprint("bp-1", "Other")).await {
        Err(StorageError::AlreadyExists {
            kind: RecordKind::Blueprint,
            id,
        }) if id == "bp-1" => Ok(()),
        other => Err(format!("expected AlreadyExists, got {other:?}")),
    }
}

async fn list_blueprints_in_insertion_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    for id in ["bp-b", "bp-a", "bp-c"] {
        storage
            .insert_blueprint(make_blueprint(id, id))
            .await
            .map_err(|e| format!("insert {id}: {e}"))?;
    }
    let ids: Vec<String> = storage
        .list_blueprints()
        .await
        .map_err(|e| format!("list: {e}"))?
        .into_iter()
        .map(|b| b.id)
        .collect();
    if ids != ["bp-b", "bp-a", "bp-c"] {
        return Err(format!("unexpected order: {ids:?}"));
    }
    Ok(())
}

async fn delete_removes_blueprint<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    storage
        .insert_blueprint(make_blueprint("bp-1", "NDA"))
        .await
        .map_err(|e| format!("insert: {e}"))?;
    let removed = storage
        .delete_blueprint("bp-1")
        .await
        .map_err(|e| format!("delete: {e}"))?;
    if removed.id != "bp-1" {
        return Err(format!("delete returned {}", removed.id));
    }
    match storage.get_blueprint("bp-1").await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("expected NotFound after delete, got {other:?}")),
    }
}

async fn delete_missing_blueprint_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    match storage.delete_blueprint("nope").await {
        Err(StorageError::NotFound {
            kind: RecordKind::Blueprint,
            id,
        }) if id == "nope" => Ok(()),
        other => Err(format!("expected NotFound, got {other:?}")),
    }
}

async fn delete_leaves_referencing_contracts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    storage
        .insert_blueprint(make_blueprint("bp-1", "NDA"))
        .await
        .map_err(|e| format!("insert blueprint: {e}"))?;
    let contract = make_contract("c-1", "bp-1");
    storage
        .insert_contract(contract.clone())
        .await
        .map_err(|e| format!("insert contract: {e}"))?;
    storage
        .delete_blueprint("bp-1")
        .await
        .map_err(|e| format!("delete: {e}"))?;
    let got = storage
        .get_contract("c-1")
        .await
        .map_err(|e| format!("contract gone after blueprint delete: {e}"))?;
    if got.fields != contract.fields || got.blueprint_id != "bp-1" {
        return Err("contract snapshot changed after blueprint delete".to_string());
    }
    Ok(())
}

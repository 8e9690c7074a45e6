use std::future::Future;

use super::{advance, make_contract, seed_contract, TestResult};
use crate::{ContractStorage, RecordKind, StorageError};

pub(super) async fn run_contract_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "contract",
            "insert_then_get_contract",
            insert_then_get_contract(factory).await,
        ),
        TestResult::from_result(
            "contract",
            "insert_resets_version_to_zero",
            insert_resets_version_to_zero(factory).await,
        ),
        TestResult::from_result(
            "contract",
            "duplicate_contract_rejected",
            duplicate_contract_rejected(factory).await,
        ),
        TestResult::from_result(
            "contract",
            "get_missing_contract_not_found",
            get_missing_contract_not_found(factory).await,
        ),
        TestResult::from_result(
            "contract",
            "update_missing_contract_not_found",
            update_missing_contract_not_found(factory).await,
        ),
        TestResult::from_result(
            "contract",
            "list_contracts_filters_by_status",
            list_contracts_filters_by_status(factory).await,
        ),
    ]
}

async fn insert_then_get_contract<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let record = make_contract("c-1", "bp-1");
    let got = seed_contract(&storage, "c-1").await?;
    if got != record {
        return Err(format!("stored contract differs: {got:?}"));
    }
    Ok(())
}

async fn insert_resets_version_to_zero<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let mut record = make_contract("c-1", "bp-1");
    record.version = 42;
    storage
        .insert_contract(record)
        .await
        .map_err(|e| format!("insert: {e}"))?;
    let got = storage
        .get_contract("c-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if got.version != 0 {
        return Err(format!("expected version 0, got {}", got.version));
    }
    Ok(())
}

async fn duplicate_contract_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    seed_contract(&storage, "c-1").await?;
    match storage.insert_contract(make_contract("c-1", "bp-2")).await {
        Err(StorageError::AlreadyExists {
            kind: RecordKind::Contract,
            ..
        }) => Ok(()),
        other => Err(format!("expected AlreadyExists, got {other:?}")),
    }
}

async fn get_missing_contract_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    match storage.get_contract("missing").await {
        Err(StorageError::NotFound {
            kind: RecordKind::Contract,
            id,
        }) if id == "missing" => Ok(()),
        other => Err(format!("expected NotFound, got {other:?}")),
    }
}

async fn update_missing_contract_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let record = advance(&make_contract("ghost", "bp-1"), "Approved");
    match storage.update_contract(record, 0).await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("expected NotFound, got {other:?}")),
    }
}

async fn list_contracts_filters_by_status<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    seed_contract(&storage, "c-1").await?;
    let second = seed_contract(&storage, "c-2").await?;
    seed_contract(&storage, "c-3").await?;
    storage
        .update_contract(advance(&second, "Approved"), 0)
        .await
        .map_err(|e| format!("update: {e}"))?;

    let all = storage
        .list_contracts(None)
        .await
        .map_err(|e| format!("list: {e}"))?;
    if all.len() != 3 {
        return Err(format!("expected 3 contracts, got {}", all.len()));
    }
    let approved = storage
        .list_contracts(Some("Approved"))
        .await
        .map_err(|e| format!("list filtered: {e}"))?;
    let ids: Vec<&str> = approved.iter().map(|c| c.id.as_str()).collect();
    if ids != ["c-2"] {
        return Err(format!("expected only c-2, got {ids:?}"));
    }
    Ok(())
}

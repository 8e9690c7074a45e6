use std::future::Future;

use super::{advance, seed_contract, TestResult};
use crate::{ContractStorage, RecordKind, StorageError};

pub(super) async fn run_version_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    // Basic version tracking
    results.push(TestResult::from_result(
        "version",
        "version_increments_sequentially",
        version_increments_sequentially(factory).await,
    ));

    // Wrong version fails
    results.push(TestResult::from_result(
        "version",
        "stale_version_returns_conflict",
        stale_version_returns_conflict(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "future_version_returns_conflict",
        future_version_returns_conflict(factory).await,
    ));

    // Conflict does not mutate state
    results.push(TestResult::from_result(
        "version",
        "conflict_does_not_change_record",
        conflict_does_not_change_record(factory).await,
    ));

    // Per-contract independence
    results.push(TestResult::from_result(
        "version",
        "version_per_contract_independent",
        version_per_contract_independent(factory).await,
    ));

    results
}

async fn version_increments_sequentially<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let mut current = seed_contract(&storage, "c-1").await?;
    for (expected, to) in [(1, "Approved"), (2, "Sent"), (3, "Signed")] {
        let new_version = storage
            .update_contract(advance(&current, to), current.version)
            .await
            .map_err(|e| format!("update to {to}: {e}"))?;
        if new_version != expected {
            return Err(format!("expected version {expected}, got {new_version}"));
        }
        current = storage
            .get_contract("c-1")
            .await
            .map_err(|e| format!("get: {e}"))?;
        if current.version != expected || current.status != to {
            return Err(format!(
                "stored record at version {} status {}, expected {expected} {to}",
                current.version, current.status
            ));
        }
    }
    Ok(())
}

async fn stale_version_returns_conflict<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let original = seed_contract(&storage, "c-1").await?;
    storage
        .update_contract(advance(&original, "Approved"), 0)
        .await
        .map_err(|e| format!("first update: {e}"))?;

    // Second writer still holds the version-0 read.
    match storage
        .update_contract(advance(&original, "Revoked"), 0)
        .await
    {
        Err(StorageError::ConcurrentConflict {
            kind: RecordKind::Contract,
            id,
            expected_version: 0,
        }) if id == "c-1" => Ok(()),
        other => Err(format!("expected ConcurrentConflict, got {other:?}")),
    }
}

async fn future_version_returns_conflict<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let original = seed_contract(&storage, "c-1").await?;
    match storage
        .update_contract(advance(&original, "Approved"), 1)
        .await
    {
        Err(StorageError::ConcurrentConflict { .. }) => Ok(()),
        other => Err(format!("expected ConcurrentConflict, got {other:?}")),
    }
}

async fn conflict_does_not_change_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let original = seed_contract(&storage, "c-1").await?;
    let _ = storage
        .update_contract(advance(&original, "Approved"), 5)
        .await;
    let after = storage
        .get_contract("c-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if after != original {
        return Err(format!("record changed after conflict: {after:?}"));
    }
    Ok(())
}

async fn version_per_contract_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let first = seed_contract(&storage, "c-1").await?;
    let second = seed_contract(&storage, "c-2").await?;
    storage
        .update_contract(advance(&first, "Approved"), 0)
        .await
        .map_err(|e| format!("update c-1: {e}"))?;
    let v = storage
        .update_contract(advance(&second, "Revoked"), 0)
        .await
        .map_err(|e| format!("update c-2 at version 0: {e}"))?;
    if v != 1 {
        return Err(format!("expected c-2 version 1, got {v}"));
    }
    Ok(())
}

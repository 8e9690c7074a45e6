use std::future::Future;

use super::{advance, make_history, seed_contract, TestResult};
use crate::{ContractStorage, StorageError};

pub(super) async fn run_history_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "history",
            "appended_history_is_accepted",
            appended_history_is_accepted(factory).await,
        ),
        TestResult::from_result(
            "history",
            "truncated_history_is_rejected",
            truncated_history_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "history",
            "rewritten_entry_is_rejected",
            rewritten_entry_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "history",
            "rejected_rewrite_keeps_version",
            rejected_rewrite_keeps_version(factory).await,
        ),
    ]
}

async fn appended_history_is_accepted<S, F, Fut>(factory: &F) -> Result<(), String>
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
        .map_err(|e| format!("update: {e}"))?;
    let got = storage
        .get_contract("c-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if got.history.len() != 2 || got.history[..1] != original.history[..] {
        return Err(format!("unexpected history: {:?}", got.history));
    }
    Ok(())
}

async fn truncated_history_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let original = seed_contract(&storage, "c-1").await?;
    let mut record = advance(&original, "Approved");
    record.history.clear();
    match storage.update_contract(record, 0).await {
        Err(StorageError::HistoryRewrite { id }) if id == "c-1" => Ok(()),
        other => Err(format!("expected HistoryRewrite, got {other:?}")),
    }
}

async fn rewritten_entry_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let original = seed_contract(&storage, "c-1").await?;
    let mut record = advance(&original, "Approved");
    record.history[0] = make_history("Created", "Backdated");
    match storage.update_contract(record, 0).await {
        Err(StorageError::HistoryRewrite { .. }) => Ok(()),
        other => Err(format!("expected HistoryRewrite, got {other:?}")),
    }
}

async fn rejected_rewrite_keeps_version<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory().await;
    let original = seed_contract(&storage, "c-1").await?;
    let mut record = advance(&original, "Approved");
    record.history.remove(0);
    let _ = storage.update_contract(record, 0).await;
    let after = storage
        .get_contract("c-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if after.version != 0 || after.status != "Created" {
        return Err(format!(
            "record mutated by rejected rewrite: version {} status {}",
            after.version, after.status
        ));
    }
    Ok(())
}

use std::future::Future;
use std::sync::Arc;

use super::{advance, seed_contract, TestResult};
use crate::{ContractStorage, StorageError};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_updates_exactly_one_wins",
        concurrent_updates_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_updates_different_contracts_all_succeed",
        concurrent_updates_different_contracts_all_succeed(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_updates_history_grows_by_one",
        concurrent_updates_history_grows_by_one(factory).await,
    ));

    results
}

/// Spawn `N` writers that all hold the same version-0 read of `c-1` and try
/// to move it to `Approved` or `Revoked`. Returns (winners, losers).
async fn race_on_one_contract<S: ContractStorage>(
    storage: Arc<S>,
) -> Result<(usize, usize), String> {
    let original = seed_contract(storage.as_ref(), "c-1").await?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let to = if i % 2 == 0 { "Approved" } else { "Revoked" };
        let record = advance(&original, to);
        handles.push(tokio::spawn(async move {
            match s.update_contract(record, 0).await {
                Ok(_) => Ok(true),
                Err(StorageError::ConcurrentConflict { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    let mut losers = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        } else {
            losers += 1;
        }
    }
    Ok((winners, losers))
}

// ── Concurrent update: exactly one wins ─────────────────────────────────────

/// This exercises real concurrency — `tokio::spawn` creates parallel tasks
/// that race against the OCC version check.
async fn concurrent_updates_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    let (winners, losers) = race_on_one_contract(storage).await?;

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    if losers != N - 1 {
        return Err(format!("expected {} losers, got {losers}", N - 1));
    }
    Ok(())
}

// ── Different contracts do not interfere ────────────────────────────────────

async fn concurrent_updates_different_contracts_all_succeed<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut originals = Vec::new();
    for i in 0..N {
        originals.push(seed_contract(storage.as_ref(), &format!("c-{i}")).await?);
    }

    let mut handles = Vec::new();
    for original in originals {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            s.update_contract(advance(&original, "Approved"), 0).await
        }));
    }

    for handle in handles {
        let version = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e| format!("update failed: {e}"))?;
        if version != 1 {
            return Err(format!("expected version 1, got {version}"));
        }
    }
    Ok(())
}

// ── Final state reflects exactly one winner ─────────────────────────────────

async fn concurrent_updates_history_grows_by_one<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    race_on_one_contract(storage.clone()).await?;

    let after = storage
        .get_contract("c-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if after.version != 1 {
        return Err(format!("expected version 1, got {}", after.version));
    }
    if after.history.len() != 2 {
        return Err(format!(
            "expected 2 history entries, got {}",
            after.history.len()
        ));
    }
    let last = after.history.last().map(|h| h.status.as_str());
    if last != Some(after.status.as_str()) {
        return Err(format!(
            "last history status {last:?} does not match status {}",
            after.status
        ));
    }
    Ok(())
}

//! Conformance test suite for `ContractStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `ContractStorage` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Blueprints**: insert, read, list order, delete, duplicate detection
//! - **Contracts**: insert, read, status filter, not-found errors
//! - **Version validation / OCC**: optimistic concurrency conflict detection
//! - **History**: append-only enforcement on update
//! - **Concurrency**: racing writers on one contract, independence across contracts
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use contractly_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn mongo_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_mongo_storage().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod blueprint;
mod concurrent;
mod contract;
mod history;
mod version;

use std::fmt;
use std::future::Future;

use crate::record::{BlueprintRecord, BoundFieldRecord, ContractRecord, FieldRecord, HistoryRecord};
use crate::ContractStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "blueprint", "version", "history").
    pub category: String,
    /// Test name (e.g. "insert_then_get_blueprint").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ContractStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(blueprint::run_blueprint_tests(&factory).await);
    results.extend(contract::run_contract_tests(&factory).await);
    results.extend(version::run_version_tests(&factory).await);
    results.extend(history::run_history_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

fn make_field(id: &str, kind: &str, label: &str) -> FieldRecord {
    FieldRecord {
        id: id.to_string(),
        kind: kind.to_string(),
        label: label.to_string(),
        placeholder: String::new(),
        input_type: "text".to_string(),
        position: None,
    }
}

fn make_blueprint(id: &str, name: &str) -> BlueprintRecord {
    BlueprintRecord {
        id: id.to_string(),
        name: name.to_string(),
        fields: vec![
            make_field("party", "Text", "Party Name"),
            make_field("terms", "Checkbox", "Terms"),
        ],
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn make_history(status: &str, action: &str) -> HistoryRecord {
    HistoryRecord {
        status: status.to_string(),
        timestamp: "2025-01-01T00:00:00Z".to_string(),
        action: action.to_string(),
    }
}

fn make_contract(id: &str, blueprint_id: &str) -> ContractRecord {
    ContractRecord {
        id: id.to_string(),
        blueprint_id: blueprint_id.to_string(),
        name: format!("contract {id}"),
        status: "Created".to_string(),
        fields: vec![
            BoundFieldRecord {
                field: make_field("party", "Text", "Party Name"),
                value: serde_json::json!("Acme Corp"),
            },
            BoundFieldRecord {
                field: make_field("terms", "Checkbox", "Terms"),
                value: serde_json::json!(true),
            },
        ],
        history: vec![make_history("Created", "Contract Instance Created")],
        version: 0,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

/// `record` moved to `to`, with the matching history entry appended.
fn advance(record: &ContractRecord, to: &str) -> ContractRecord {
    let mut next = record.clone();
    next.history.push(make_history(
        to,
        &format!("Moved from {} to {}", record.status, to),
    ));
    next.status = to.to_string();
    next
}

/// Insert a contract and return it as stored.
async fn seed_contract<S: ContractStorage>(
    storage: &S,
    id: &str,
) -> Result<ContractRecord, String> {
    storage
        .insert_contract(make_contract(id, "bp-1"))
        .await
        .map_err(|e| format!("insert: {e}"))?;
    storage
        .get_contract(id)
        .await
        .map_err(|e| format!("get after insert: {e}"))
}

//! Runs the backend-agnostic conformance suite against `MemoryStorage`.

use contractly_storage::conformance::run_conformance_suite;
use contractly_storage::MemoryStorage;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_storage_conformance() {
    let report = run_conformance_suite(|| async { MemoryStorage::new() }).await;
    assert!(report.total > 0);
    assert_eq!(report.failed, 0, "{report}");
}

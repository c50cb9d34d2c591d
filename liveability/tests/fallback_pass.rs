mod common;

use common::{seed_store, supermarket, Script, ScriptedOracle};
use liveability::model::{driver::ResumableDriver, ledger::WorkUnit, store::Store};
use liveability_core::model::{CategoryCode, OriginId, PartitionId, ProgressStatus};

fn unit(partition: &str) -> WorkUnit {
    WorkUnit::new(
        PartitionId::from(partition),
        Some(CategoryCode::from("supermarket")),
    )
}

#[test]
fn test_fallback_isolates_failing_origin() {
    let dir = tempfile::tempdir().expect("temp dir");
    let database = seed_store(&dir, &[("A", "1"), ("B", "1"), ("C", "1")]);
    let oracle = ScriptedOracle::new(&[
        ("A", Script::Distance(500.0)),
        ("B", Script::NoPath),
        ("C", Script::Fail),
    ]);
    // a single chunk per partition, so C takes A and B down with it
    let driver = ResumableDriver::new(&database, oracle.builder(), vec![supermarket()])
        .with_workers(1)
        .with_chunk_size(200);
    let coarse = driver.run(&[]).expect("coarse run");
    assert_eq!(coarse.errored(), 1);
    {
        let store = Store::open(&database).expect("open");
        let rows = store.accumulator(100).load_results(None).expect("results");
        assert!(rows.is_empty());
    }

    let fine = driver.run_fallback().expect("fallback");
    assert_eq!(fine.outcomes.len(), 1);
    assert_eq!(fine.outcomes[0].failed_calls, 1);

    let store = Store::open(&database).expect("open");
    let failures = store.origin_failures().expect("failures");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].origin_id, OriginId::from("C"));
    assert_eq!(failures[0].partition_id, PartitionId::from("1"));

    let rows = store.accumulator(100).load_results(None).expect("results");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].distance_meters(), Some(500.0));
    assert_eq!(rows[1].distance_meters(), None);
    let progress = store.ledger().get(&unit("1")).expect("ledger").expect("row");
    assert_eq!(progress.status, ProgressStatus::Error);
}

#[test]
fn test_fallback_completes_unit_once_every_origin_succeeds() {
    let dir = tempfile::tempdir().expect("temp dir");
    let database = seed_store(&dir, &[("A", "1"), ("C", "1")]);
    let oracle = ScriptedOracle::new(&[("A", Script::Distance(500.0)), ("C", Script::Fail)]);
    let driver = ResumableDriver::new(&database, oracle.builder(), vec![supermarket()])
        .with_workers(1)
        .with_chunk_size(200);
    driver.run(&[]).expect("coarse run");
    driver.run_fallback().expect("first fallback");

    oracle.set("C", Script::Distance(750.0));
    let summary = driver.run_fallback().expect("second fallback");
    assert!(summary.is_complete());

    let store = Store::open(&database).expect("open");
    assert!(store.origin_failures().expect("failures").is_empty());
    let progress = store.ledger().get(&unit("1")).expect("ledger").expect("row");
    assert_eq!(progress.status, ProgressStatus::Completed);

    // a completed unit is never scheduled again
    let calls_before = oracle.calls_for("A");
    let again = driver.run(&[]).expect("rerun");
    assert!(again.outcomes.is_empty());
    assert_eq!(oracle.calls_for("A"), calls_before);
}

#[test]
fn test_fallback_without_errors_does_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let database = seed_store(&dir, &[("A", "1")]);
    let oracle = ScriptedOracle::new(&[("A", Script::Distance(500.0))]);
    let driver = ResumableDriver::new(&database, oracle.builder(), vec![supermarket()]);
    driver.run(&[]).expect("run");
    let summary = driver.run_fallback().expect("fallback");
    assert!(summary.outcomes.is_empty());
}

use edgar_alerts::ProcessedLedger;

#[tokio::test]
async fn contains_is_false_for_unknown_ids() {
    let ledger = ProcessedLedger::open_in_memory().await.expect("open ledger");

    let seen = ledger.contains("0001234567-25-000001").await.expect("lookup");
    assert!(!seen);
}

#[tokio::test]
async fn recorded_ids_are_found() {
    let ledger = ProcessedLedger::open_in_memory().await.expect("open ledger");

    ledger.record("0001234567-25-000001").await.expect("record");

    let seen = ledger.contains("0001234567-25-000001").await.expect("lookup");
    assert!(seen);
    assert_eq!(ledger.count().await.expect("count"), 1);
}

#[tokio::test]
async fn recording_twice_is_a_no_op() {
    let ledger = ProcessedLedger::open_in_memory().await.expect("open ledger");

    ledger.record("0001234567-25-000001").await.expect("first record");
    ledger
        .record("0001234567-25-000001")
        .await
        .expect("re-recording an id must not error");

    assert_eq!(ledger.count().await.expect("count"), 1);
}

#[tokio::test]
async fn ledger_survives_reopen_at_the_same_path() {
    let path = std::env::temp_dir().join(format!(
        "edgar-alerts-ledger-test-{}.db",
        std::process::id()
    ));
    let path = path.to_str().expect("utf-8 temp path").to_string();
    let _ = std::fs::remove_file(&path);

    {
        let ledger = ProcessedLedger::open(&path).await.expect("first open");
        ledger.record("0001234567-25-000001").await.expect("record");
    }

    // Opening again re-runs schema creation against the existing file.
    let reopened = ProcessedLedger::open(&path).await.expect("second open");
    let seen = reopened
        .contains("0001234567-25-000001")
        .await
        .expect("lookup");
    assert!(seen, "entries must survive a process restart");

    let _ = std::fs::remove_file(&path);
}

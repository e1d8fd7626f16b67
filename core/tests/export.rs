mod common;

use common::*;
use influence_core::{
    config::PayoutAttribution,
    error::ReportError,
    loader::SourceTable,
    store::ReportStore,
};

fn store() -> ReportStore {
    let store = ReportStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

#[test]
fn export_writes_every_table() {
    let store = store();
    let snapshot = fixture_snapshot();

    let export_id = store.export_snapshot(&snapshot, "test").unwrap();

    assert_eq!(store.merged_row_count(&export_id).unwrap(), 5);
    assert_eq!(store.influencer_summary_count(&export_id).unwrap(), 3);
    assert_eq!(store.campaign_summary_count(&export_id).unwrap(), 2);
}

#[test]
fn campaign_rows_read_back_unchanged() {
    let store = store();
    let snapshot = fixture_snapshot();
    let export_id = store.export_snapshot(&snapshot, "test").unwrap();

    let campaigns = store.campaign_summaries(&export_id).unwrap();

    assert_eq!(campaigns, snapshot.campaigns);
}

#[test]
fn latest_export_records_fingerprint_and_baseline() {
    let store = store();
    assert!(store.latest_export().unwrap().is_none());

    let snapshot = fixture_snapshot();
    let export_id = store.export_snapshot(&snapshot, "0.1.0").unwrap();
    let record = store.latest_export().unwrap().unwrap();

    assert_eq!(record.export_id, export_id);
    assert_eq!(record.fingerprint, snapshot.fingerprint.as_str());
    assert_eq!(record.version, "0.1.0");
    assert_close(record.baseline_roas, snapshot.baseline_roas, "baseline");
    assert!(store.has_fingerprint(snapshot.fingerprint.as_str()).unwrap());
    assert!(!store.has_fingerprint("deadbeef").unwrap());
}

#[test]
fn repeated_exports_are_kept_apart() {
    let store = store();
    let snapshot = fixture_snapshot();

    let first = store.export_snapshot(&snapshot, "test").unwrap();
    let second = store.export_snapshot(&snapshot, "test").unwrap();

    assert_ne!(first, second);
    assert_eq!(store.merged_row_count(&first).unwrap(), 5);
    assert_eq!(store.merged_row_count(&second).unwrap(), 5);
}

#[test]
fn migrate_is_idempotent() {
    let store = store();
    store.migrate().unwrap();
}

#[test]
fn export_to_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.db");
    let path = path.to_str().unwrap();

    let export_id = {
        let store = ReportStore::open(path).unwrap();
        store.migrate().unwrap();
        store.export_snapshot(&fixture_snapshot(), "test").unwrap()
    };

    let reopened = ReportStore::open(path).unwrap();
    assert_eq!(reopened.latest_export().unwrap().unwrap().export_id, export_id);
}

/// SQLite integers are signed; a count above `i64::MAX` fails the export
/// and leaves nothing behind.
#[test]
fn counts_beyond_sqlite_range_are_rejected() {
    let posts = "\
post_id,influencer_id,caption,reach,likes,comments
P1,INF1,Huge,18446744073709551615,1,1
";
    let store = store();
    let snapshot = snapshot_with(&source_from(INFLUENCERS, posts, TRACKING, PAYOUTS), PayoutAttribution::PerPost);

    match store.export_snapshot(&snapshot, "test") {
        Err(ReportError::Schema { source_table, column, .. }) => {
            assert_eq!(source_table, SourceTable::Posts);
            assert_eq!(column, "reach");
        }
        other => panic!("expected a schema error, got {other:?}"),
    }
    assert!(store.latest_export().unwrap().is_none(), "export rolled back");
}

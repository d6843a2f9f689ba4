//! CSV dataset merge, backup and rewrite behaviour on disk

use chrono::{Duration, NaiveDateTime};
use errata_locator::dataset::CommitReport;
use errata_locator::{Column, CsvStore, ErrataRecord, MergeMode, PageContext, normalize};
use tempfile::TempDir;

mod common;

use common::{processing_time, raw};

fn record(description: &str, date: &str, at: NaiveDateTime) -> ErrataRecord {
    normalize(&raw(description, date), &PageContext::new("/errata", "Grade 3"), at).unwrap()
}

fn store(dir: &TempDir) -> CsvStore {
    CsvStore::new(
        dir.path().join("errata_changes.csv"),
        dir.path().join("backups"),
        Column::ALL.to_vec(),
    )
}

fn backups(dir: &TempDir) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir.path().join("backups")) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn test_full_merge_into_empty_destination() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let now = processing_time();

    let report: CommitReport = store
        .commit(
            vec![record("Fixed typo", "2024-03-14", now), record("New figure", "2024-03-15", now)],
            MergeMode::Full,
            1,
            now,
        )
        .unwrap();

    assert_eq!(report.stats.written, 2);
    assert_eq!(report.stats.dropped_invalid, 1);
    assert_eq!(report.stats.total_rows, 2);
    assert!(report.backup.is_none(), "nothing to back up yet");
    assert!(report.rewritten);

    let text = std::fs::read_to_string(store.path()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Date_Extracted,Unit,Resource,Location,Instructional_Moment,Page_Numbers,Improvement_Description,Improvement_Type,Date_Updated"
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_full_mode_backs_up_and_replaces() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let now = processing_time();

    store
        .commit(vec![record("Old erratum", "2024-01-01", now)], MergeMode::Full, 0, now)
        .unwrap();
    let later = now + Duration::hours(1);
    let report = store
        .commit(vec![record("New erratum", "2024-02-01", later)], MergeMode::Full, 0, later)
        .unwrap();

    let backup = report.backup.expect("existing dataset is backed up");
    assert!(backup.file_name().unwrap().to_string_lossy().starts_with("errata_changes_backup_"));
    assert!(std::fs::read_to_string(&backup).unwrap().contains("Old erratum"));

    let rows = store.load_existing().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].improvement_description(), "New erratum");
}

#[test]
fn test_backups_with_same_timestamp_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let now = processing_time();

    store
        .commit(vec![record("A", "", now)], MergeMode::Full, 0, now)
        .unwrap();
    let first = store.backup(now).unwrap().unwrap();
    let second = store.backup(now).unwrap().unwrap();
    assert_ne!(first, second);
    assert_eq!(backups(&dir).len(), 2);
}

#[test]
fn test_incremental_twice_writes_nothing_the_second_time() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let now = processing_time();
    let new_records = || {
        vec![
            record("Fixed typo", "2024-03-14", now),
            record("New figure", "2024-03-15", now),
        ]
    };

    let first = store
        .commit(new_records(), MergeMode::Incremental, 0, now)
        .unwrap();
    assert_eq!(first.stats.written, 2);
    let written = std::fs::read_to_string(store.path()).unwrap();

    // Same errata seen a day later: only Date_Extracted differs
    let later = now + Duration::days(1);
    let second = store
        .commit(
            vec![
                record("Fixed typo", "2024-03-14", later),
                record("New figure", "2024-03-15", later),
            ],
            MergeMode::Incremental,
            0,
            later,
        )
        .unwrap();

    assert_eq!(second.stats.written, 0);
    assert_eq!(second.stats.skipped_duplicate, 2);
    assert!(!second.rewritten);
    assert!(second.backup.is_none());
    assert!(backups(&dir).is_empty());
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), written);
}

#[test]
fn test_incremental_appends_only_new_rows() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let now = processing_time();

    store
        .commit(vec![record("Fixed typo", "2024-03-14", now)], MergeMode::Incremental, 0, now)
        .unwrap();
    let report = store
        .commit(
            vec![
                record("Fixed typo", "2024-03-14", now),
                record("Replaced diagram", "2024-04-02", now),
            ],
            MergeMode::Incremental,
            0,
            now,
        )
        .unwrap();

    assert_eq!(report.stats.written, 1);
    assert_eq!(report.stats.total_rows, 2);
    assert!(report.backup.is_some());

    let rows = store.load_existing().unwrap();
    let descriptions: Vec<_> = rows.iter().map(ErrataRecord::improvement_description).collect();
    assert_eq!(descriptions, ["Fixed typo", "Replaced diagram"]);
}

#[test]
fn test_load_existing_matches_columns_by_header() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    std::fs::write(
        store.path(),
        "Improvement_Description,Legacy_Notes,Unit\nFixed typo,ignored,Grade 5\n",
    )
    .unwrap();

    let rows = store.load_existing().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].improvement_description(), "Fixed typo");
    assert_eq!(rows[0].unit(), "Grade 5");
    assert_eq!(rows[0].resource(), "");
}

#[test]
fn test_configured_column_subset_and_order() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(
        dir.path().join("subset.csv"),
        dir.path().join("backups"),
        vec![Column::ImprovementDescription, Column::Unit],
    );
    let now = processing_time();
    store
        .commit(vec![record("Comma, inside", "", now)], MergeMode::Full, 0, now)
        .unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(text, "Improvement_Description,Unit\n\"Comma, inside\",Grade 3\n");
}

#[test]
fn test_incremental_is_idempotent_when_identity_columns_are_not_written() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(
        dir.path().join("narrow.csv"),
        dir.path().join("backups"),
        vec![Column::Unit, Column::ImprovementDescription, Column::DateUpdated],
    );
    let now = processing_time();
    let located = || {
        let mut raw = raw("Fixed typo", "2024-03-14");
        raw.location = "Lesson 3".to_string();
        normalize(&raw, &PageContext::new("/errata", "Grade 3"), now).unwrap()
    };
    assert_eq!(located().location(), "Lesson 3");

    let first = store.commit(vec![located()], MergeMode::Incremental, 0, now).unwrap();
    let second = store.commit(vec![located()], MergeMode::Incremental, 0, now).unwrap();
    let third = store.commit(vec![located()], MergeMode::Incremental, 0, now).unwrap();

    assert_eq!(first.stats.written, 1);
    assert_eq!(second.stats.written, 0);
    assert_eq!(second.stats.skipped_duplicate, 1);
    assert!(!second.rewritten);
    assert_eq!(third.stats.written, 0);
    assert_eq!(store.load_existing().unwrap().len(), 1);
}

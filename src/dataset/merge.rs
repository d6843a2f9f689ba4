//! Reconciliation of new records with an existing dataset

use std::collections::HashSet;

use super::schema::{ErrataRecord, RecordKey};

/// How new records combine with what is already on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Replace the dataset with this run's records
    #[default]
    Full,
    /// Append only records the dataset does not already hold
    Incremental,
}

/// Counters reported for one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// New records offered to the merge
    pub seen: usize,
    /// New records that made it into the output
    pub written: usize,
    /// New records discarded as duplicates
    pub skipped_duplicate: usize,
    /// Records dropped by validation before the merge
    pub dropped_invalid: usize,
    /// Rows in the output
    pub total_rows: usize,
}

/// Merge `new_records` into `existing`.
///
/// Full mode ignores `existing` and keeps the first occurrence of each
/// identity in `new_records`. Incremental mode keeps every existing row in
/// order and appends new records whose identity is not yet present.
/// Existing rows are never altered or deduplicated among themselves.
#[must_use]
pub fn merge(
    existing: Vec<ErrataRecord>,
    new_records: Vec<ErrataRecord>,
    mode: MergeMode,
) -> (Vec<ErrataRecord>, MergeStats) {
    let mut stats = MergeStats {
        seen: new_records.len(),
        ..MergeStats::default()
    };

    let mut rows = match mode {
        MergeMode::Full => Vec::with_capacity(new_records.len()),
        MergeMode::Incremental => existing,
    };
    let mut known: HashSet<RecordKey> = rows.iter().map(ErrataRecord::key).collect();

    for record in new_records {
        if known.insert(record.key()) {
            rows.push(record);
            stats.written += 1;
        } else {
            stats.skipped_duplicate += 1;
        }
    }

    stats.total_rows = rows.len();
    (rows, stats)
}

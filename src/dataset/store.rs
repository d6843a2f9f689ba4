//! CSV persistence: loading, timestamped backups and atomic rewrites

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::merge::{MergeMode, MergeStats, merge};
use super::schema::{Column, ErrataRecord};
use crate::errors::{ErrataError, ErrataResult};
use crate::utils::BACKUP_TIMESTAMP_FORMAT;

/// What [`CsvStore::commit`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub stats: MergeStats,
    /// Backup copy taken before the rewrite, if any
    pub backup: Option<PathBuf>,
    /// Whether the destination file was (re)written
    pub rewritten: bool,
}

/// The on-disk dataset
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    backup_dir: PathBuf,
    columns: Vec<Column>,
}

impl CsvStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>, columns: Vec<Column>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
            columns,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Read the existing dataset. A missing file is an empty dataset.
    ///
    /// Columns are matched by header name, so a file written with a different
    /// column order still loads; unknown headers are ignored.
    pub fn load_existing(&self) -> ErrataResult<Vec<ErrataRecord>> {
        if !self.path.exists() {
            debug!(target: "errata::dataset", path = %self.path.display(), "No existing dataset");
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let header: Vec<Option<Column>> = reader
            .headers()?
            .iter()
            .map(|name| match name.parse::<Column>() {
                Ok(column) => Some(column),
                Err(e) => {
                    warn!(target: "errata::dataset", path = %self.path.display(), "Ignoring column: {e}");
                    None
                }
            })
            .collect();

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row?;
            rows.push(ErrataRecord::from_columns(
                header
                    .iter()
                    .zip(row.iter())
                    .filter_map(|(column, value)| column.map(|c| (c, value))),
            ));
        }

        debug!(
            target: "errata::dataset",
            path = %self.path.display(),
            rows = rows.len(),
            "Loaded existing dataset"
        );
        Ok(rows)
    }

    /// Copy the current file to the backup directory.
    /// Returns `None` when there is nothing to back up.
    pub fn backup(&self, now: NaiveDateTime) -> ErrataResult<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir)?;
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("errata");
        let timestamp = now.format(BACKUP_TIMESTAMP_FORMAT);

        let mut target = self.backup_dir.join(format!("{stem}_backup_{timestamp}.csv"));
        let mut n = 1;
        while target.exists() {
            target = self
                .backup_dir
                .join(format!("{stem}_backup_{timestamp}_{n}.csv"));
            n += 1;
        }

        fs::copy(&self.path, &target)?;
        info!(target: "errata::dataset", backup = %target.display(), "Backed up dataset");
        Ok(Some(target))
    }

    /// Replace the dataset with `rows`: written to a temporary file in the
    /// destination directory, then renamed over the destination.
    pub fn write_atomic(&self, rows: &[ErrataRecord]) -> ErrataResult<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        let mut writer = csv::Writer::from_writer(temp);
        writer.write_record(self.columns.iter().map(|c| c.as_str()))?;
        for record in rows {
            writer.write_record(self.columns.iter().map(|c| record.get(*c)))?;
        }
        writer.flush()?;

        let temp = writer
            .into_inner()
            .map_err(|e| ErrataError::Io(e.into_error()))?;
        temp.persist(&self.path)
            .map_err(|e| ErrataError::Io(e.error))?;

        info!(
            target: "errata::dataset",
            path = %self.path.display(),
            rows = rows.len(),
            "Wrote dataset"
        );
        Ok(())
    }

    /// Merge this run's records into the dataset and persist the result.
    ///
    /// Full mode always backs up an existing file and rewrites it. Incremental
    /// mode leaves the file untouched (no backup) when no new row was added.
    ///
    /// New records are reduced to the persisted columns before the merge, so
    /// their identity matches rows loaded back from the file even when
    /// identity columns are not written.
    pub fn commit(
        &self,
        new_records: Vec<ErrataRecord>,
        mode: MergeMode,
        dropped_invalid: usize,
        now: NaiveDateTime,
    ) -> ErrataResult<CommitReport> {
        let existing = match mode {
            MergeMode::Full => Vec::new(),
            MergeMode::Incremental => self.load_existing()?,
        };

        let new_records = new_records
            .iter()
            .map(|record| record.project(&self.columns))
            .collect();
        let (rows, mut stats) = merge(existing, new_records, mode);
        stats.dropped_invalid = dropped_invalid;

        if mode == MergeMode::Incremental && stats.written == 0 && self.path.exists() {
            info!(
                target: "errata::dataset",
                path = %self.path.display(),
                skipped = stats.skipped_duplicate,
                "No new records, dataset left unchanged"
            );
            return Ok(CommitReport {
                stats,
                backup: None,
                rewritten: false,
            });
        }

        let backup = self.backup(now)?;
        self.write_atomic(&rows)?;

        Ok(CommitReport {
            stats,
            backup,
            rewritten: true,
        })
    }
}

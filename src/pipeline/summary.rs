//! Plain-text run summary (`extraction_summary.txt`)

use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::dataset::{Column, ErrataRecord};
use crate::utils::{EXTRACTED_AT_FORMAT, SUMMARY_FILE_NAME};

use super::report::RunReport;

/// Value counts of one column, most frequent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    pub column: Column,
    pub counts: Vec<(String, usize)>,
}

impl Breakdown {
    #[must_use]
    pub fn of(records: &[ErrataRecord], column: Column) -> Self {
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for record in records {
            let value = record.get(column);
            let value = if value.is_empty() { "(blank)" } else { value };
            *tally.entry(value).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> =
            tally.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { column, counts }
    }
}

/// Path of the summary for a dataset at `csv_path`
#[must_use]
pub fn summary_path(csv_path: &Path) -> PathBuf {
    match csv_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(SUMMARY_FILE_NAME),
        _ => PathBuf::from(SUMMARY_FILE_NAME),
    }
}

/// Render the summary text for a run and the records it extracted
#[must_use]
pub fn render_summary(report: &RunReport, records: &[ErrataRecord]) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "Errata Extraction Summary");
    let _ = writeln!(out, "=========================");
    let _ = writeln!(out, "Run started: {}", report.started_at.format(EXTRACTED_AT_FORMAT));
    let _ = writeln!(out, "Mode: {:?}", report.mode);
    let _ = writeln!(out, "Outcome: {}", report.outcome.as_str());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Pages: {} attempted, {} succeeded, {} failed",
        report.pages_attempted(),
        report.pages_succeeded(),
        report.pages_failed()
    );
    let _ = writeln!(
        out,
        "Records: {} extracted, {} dropped by validation",
        report.records_extracted(),
        report.dropped_invalid
    );
    if report.reauthentications > 0 {
        let _ = writeln!(out, "Re-authentications: {}", report.reauthentications);
    }
    if let Some(stats) = &report.merge {
        let _ = writeln!(
            out,
            "Dataset: {} written, {} duplicates skipped, {} total rows",
            stats.written, stats.skipped_duplicate, stats.total_rows
        );
    }
    if let Some(backup) = &report.backup {
        let _ = writeln!(out, "Backup: {}", backup.display());
    }

    for column in [Column::Unit, Column::Resource, Column::ImprovementType] {
        let breakdown = Breakdown::of(records, column);
        if breakdown.counts.is_empty() {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Records by {column}:");
        for (value, count) in &breakdown.counts {
            let _ = writeln!(out, "  {value}: {count}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Pages:");
    for page in &report.pages {
        match &page.error {
            None => {
                let _ = writeln!(
                    out,
                    "  [ok]     {} ({} records, {} dropped) {} {}",
                    page.page_id,
                    page.records,
                    page.dropped,
                    page.title.as_deref().unwrap_or("-"),
                    page.url
                );
            }
            Some(error) => {
                let _ = writeln!(out, "  [failed] {} {}", page.page_id, error);
            }
        }
    }
    out
}

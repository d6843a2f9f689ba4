//! Run and page reports

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::dataset::{MergeMode, MergeStats};

/// Outcome of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page_id: String,
    pub url: String,
    pub title: Option<String>,
    /// Records that passed normalization
    pub records: usize,
    /// Records dropped by validation
    pub dropped: usize,
    /// Failure reason when the page could not be fetched
    pub error: Option<String>,
}

impl PageReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// How the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// New rows were written
    Updated,
    /// Records were extracted but every one was already in the dataset
    NoChanges,
    /// Pages loaded but no valid record was found on any of them
    NoRecordsFound,
    /// Every page failed; the dataset was not touched
    AllPagesFailed,
}

impl RunOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Updated => "updated",
            RunOutcome::NoChanges => "no changes",
            RunOutcome::NoRecordsFound => "no records found",
            RunOutcome::AllPagesFailed => "all pages failed",
        }
    }
}

/// Everything a run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: NaiveDateTime,
    pub mode: MergeMode,
    pub pages: Vec<PageReport>,
    pub reauthentications: usize,
    pub dropped_invalid: usize,
    /// Present when the dataset merge ran
    pub merge: Option<MergeStats>,
    pub backup: Option<PathBuf>,
    pub dataset_rewritten: bool,
    pub summary_path: Option<PathBuf>,
    pub outcome: RunOutcome,
}

impl RunReport {
    #[must_use]
    pub fn pages_attempted(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn pages_succeeded(&self) -> usize {
        self.pages.iter().filter(|p| p.succeeded()).count()
    }

    #[must_use]
    pub fn pages_failed(&self) -> usize {
        self.pages_attempted() - self.pages_succeeded()
    }

    /// Records that survived normalization across all pages
    #[must_use]
    pub fn records_extracted(&self) -> usize {
        self.pages.iter().map(|p| p.records).sum()
    }

    /// Whether the process should exit successfully
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome != RunOutcome::AllPagesFailed
    }
}

/// Result of `--test-auth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthProbe {
    /// Session passed the logged-in check right after login
    pub verified: bool,
    pub page_id: String,
    pub url: String,
    pub title: Option<String>,
    pub html_bytes: usize,
}

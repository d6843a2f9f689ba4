//! Orchestration: authenticate, then render, extract and normalize each
//! configured page in order, then merge into the dataset
//!
//! Pages are processed one at a time on the current task. Only the session
//! and the accumulated records cross page boundaries.

pub mod report;
pub mod strategy;
pub mod summary;

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use scraper::Html;
use tracing::{debug, error, info, warn};

use crate::auth::{Authenticator, Session};
use crate::config::{ErrataConfig, PageSpec};
use crate::credentials::Credentials;
use crate::dataset::{CsvStore, ErrataRecord, MergeMode};
use crate::errors::{AuthError, ConfigError, ErrataResult, FetchError};
use crate::extract::extract;
use crate::normalize::{PageContext, derive_page_label, normalize};
use crate::render::{RenderedPage, Renderer, with_page_timeout};
use crate::utils::safe_truncate_chars;

pub use report::{AuthProbe, PageReport, RunOutcome, RunReport};
pub use strategy::{FetchStrategy, probe_with_strategy, run_with_strategy};

/// Records and page reports gathered before the merge
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub records: Vec<ErrataRecord>,
    pub pages: Vec<PageReport>,
    pub dropped_invalid: usize,
    pub reauthentications: usize,
}

/// Records from one rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecords {
    pub records: Vec<ErrataRecord>,
    pub dropped: usize,
}

/// Configured run over a fixed page list and dataset
#[derive(Debug, Clone)]
pub struct Pipeline {
    pages: Vec<PageSpec>,
    store: CsvStore,
    delay: Duration,
    page_timeout: Duration,
    write_summary: bool,
}

impl Pipeline {
    pub fn new(config: &ErrataConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pages: config.page_specs()?,
            store: CsvStore::new(config.csv_path(), config.backup_path(), config.columns()?),
            delay: config.delay_between_requests(),
            page_timeout: config.page_timeout(),
            write_summary: config.write_summary(),
        })
    }

    #[must_use]
    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }

    #[must_use]
    pub fn store(&self) -> &CsvStore {
        &self.store
    }

    async fn render_once<R: Renderer>(
        &self,
        renderer: &R,
        session: &R::Session,
        page: &PageSpec,
    ) -> Result<RenderedPage, FetchError> {
        with_page_timeout(
            renderer.render(session, page),
            self.page_timeout,
            page.url().as_str(),
            "render page",
        )
        .await
    }

    /// Render a page, re-authenticating once if the session has expired.
    ///
    /// A failed re-authentication is an [`AuthError`] and ends the run.
    async fn render_with_reauth<A, R>(
        &self,
        auth: &A,
        renderer: &R,
        session: &mut A::Session,
        credentials: &Credentials,
        page: &PageSpec,
        reauthentications: &mut usize,
    ) -> Result<Result<RenderedPage, FetchError>, AuthError>
    where
        A: Authenticator,
        R: Renderer<Session = A::Session>,
    {
        match self.render_once(renderer, session, page).await {
            Err(e) if e.is_session_expired() => {
                warn!(
                    target: "errata::pipeline",
                    page = %page.id(),
                    acquired_at = %session.acquired_at(),
                    "Session expired, re-authenticating"
                );
                let fresh = auth.authenticate(credentials).await?;
                std::mem::replace(session, fresh).close().await;
                *reauthentications += 1;
                Ok(self.render_once(renderer, session, page).await)
            }
            other => Ok(other),
        }
    }

    /// Authenticate and process every page, without touching the dataset.
    ///
    /// The session is closed before returning, whether or not the run
    /// completed.
    pub async fn collect<A, R>(
        &self,
        auth: &A,
        renderer: &R,
        credentials: &Credentials,
    ) -> Result<Collected, AuthError>
    where
        A: Authenticator,
        R: Renderer<Session = A::Session>,
    {
        let mut collected = Collected::default();
        let mut session = auth.authenticate(credentials).await?;
        let result = self
            .collect_pages(auth, renderer, credentials, &mut session, &mut collected)
            .await;
        session.close().await;
        result.map(|()| collected)
    }

    async fn collect_pages<A, R>(
        &self,
        auth: &A,
        renderer: &R,
        credentials: &Credentials,
        session: &mut A::Session,
        collected: &mut Collected,
    ) -> Result<(), AuthError>
    where
        A: Authenticator,
        R: Renderer<Session = A::Session>,
    {
        if !session.verify().await {
            warn!(target: "errata::pipeline", "Fresh session failed verification, logging in again");
            let fresh = auth.authenticate(credentials).await?;
            std::mem::replace(session, fresh).close().await;
            collected.reauthentications += 1;
        }

        let total = self.pages.len();
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            info!(
                target: "errata::pipeline",
                page = %page.id(),
                "Processing page {}/{}",
                index + 1,
                total
            );

            let rendered = self
                .render_with_reauth(
                    auth,
                    renderer,
                    session,
                    credentials,
                    page,
                    &mut collected.reauthentications,
                )
                .await?;

            match rendered {
                Ok(rendered) => {
                    let extracted_at = Local::now().naive_local();
                    let page_records = records_from_page(page, &rendered, extracted_at);
                    info!(
                        target: "errata::pipeline",
                        page = %page.id(),
                        records = page_records.records.len(),
                        dropped = page_records.dropped,
                        "Page done"
                    );
                    collected.dropped_invalid += page_records.dropped;
                    collected.pages.push(PageReport {
                        page_id: page.id().to_string(),
                        url: rendered.url,
                        title: rendered.title,
                        records: page_records.records.len(),
                        dropped: page_records.dropped,
                        error: None,
                    });
                    collected.records.extend(page_records.records);
                }
                Err(e) => {
                    warn!(
                        target: "errata::pipeline",
                        page = %page.id(),
                        error = %e,
                        "Page failed, continuing"
                    );
                    collected.pages.push(PageReport {
                        page_id: page.id().to_string(),
                        url: page.url().to_string(),
                        title: None,
                        records: 0,
                        dropped: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(())
    }

    /// Full run: collect, merge into the dataset, write the summary
    pub async fn run<A, R>(
        &self,
        auth: &A,
        renderer: &R,
        credentials: &Credentials,
        mode: MergeMode,
    ) -> ErrataResult<RunReport>
    where
        A: Authenticator,
        R: Renderer<Session = A::Session>,
    {
        let started_at = Local::now().naive_local();
        let collected = self.collect(auth, renderer, credentials).await?;
        self.finish(collected, mode, started_at)
    }

    /// Merge collected records and build the report
    pub fn finish(
        &self,
        collected: Collected,
        mode: MergeMode,
        started_at: NaiveDateTime,
    ) -> ErrataResult<RunReport> {
        let mut report = RunReport {
            started_at,
            mode,
            pages: collected.pages,
            reauthentications: collected.reauthentications,
            dropped_invalid: collected.dropped_invalid,
            merge: None,
            backup: None,
            dataset_rewritten: false,
            summary_path: None,
            outcome: RunOutcome::AllPagesFailed,
        };

        if report.pages_succeeded() == 0 {
            error!(
                target: "errata::pipeline",
                pages = report.pages_attempted(),
                "Every page failed; dataset left untouched"
            );
            self.write_summary_file(&mut report, &collected.records);
            return Ok(report);
        }

        let records = collected.records;
        let commit = self.store.commit(
            records.clone(),
            mode,
            collected.dropped_invalid,
            Local::now().naive_local(),
        )?;

        report.outcome = if records.is_empty() {
            RunOutcome::NoRecordsFound
        } else if commit.stats.written == 0 {
            RunOutcome::NoChanges
        } else {
            RunOutcome::Updated
        };
        report.merge = Some(commit.stats);
        report.backup = commit.backup;
        report.dataset_rewritten = commit.rewritten;

        info!(
            target: "errata::pipeline",
            outcome = report.outcome.as_str(),
            written = commit.stats.written,
            skipped_duplicate = commit.stats.skipped_duplicate,
            dropped_invalid = commit.stats.dropped_invalid,
            total_rows = commit.stats.total_rows,
            failed_pages = report.pages_failed(),
            "Run finished"
        );

        self.write_summary_file(&mut report, &records);
        Ok(report)
    }

    fn write_summary_file(&self, report: &mut RunReport, records: &[ErrataRecord]) {
        if !self.write_summary {
            return;
        }
        let path = summary::summary_path(self.store.path());
        let text = summary::render_summary(report, records);
        let written = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&path, text));
        match written {
            Ok(()) => report.summary_path = Some(path),
            Err(e) => warn!(
                target: "errata::pipeline",
                path = %path.display(),
                "Failed to write summary: {e}"
            ),
        }
    }

    /// Log in, verify, and fetch the first page without extracting anything
    pub async fn probe<A, R>(
        &self,
        auth: &A,
        renderer: &R,
        credentials: &Credentials,
    ) -> ErrataResult<AuthProbe>
    where
        A: Authenticator,
        R: Renderer<Session = A::Session>,
    {
        let page = self
            .pages
            .first()
            .ok_or_else(|| ConfigError::MissingKey("website.errata_pages".to_string()))?;

        let session = auth.authenticate(credentials).await?;
        let verified = session.verify().await;
        let rendered = self.render_once(renderer, &session, page).await;
        session.close().await;
        let rendered = rendered?;

        Ok(AuthProbe {
            verified,
            page_id: page.id().to_string(),
            url: rendered.url,
            title: rendered.title,
            html_bytes: rendered.html.len(),
        })
    }
}

/// Extract and normalize every record of a rendered page.
///
/// The unit label falls back to the configured page unit, then a label
/// derived from the title or URL, then the page path.
#[must_use]
pub fn records_from_page(
    page: &PageSpec,
    rendered: &RenderedPage,
    extracted_at: NaiveDateTime,
) -> PageRecords {
    let unit_label = page
        .unit()
        .map(str::to_string)
        .or_else(|| derive_page_label(rendered.title.as_deref(), &rendered.url))
        .unwrap_or_else(|| page.id().to_string());
    debug!(
        target: "errata::extract",
        page = %page.id(),
        unit = %unit_label,
        row_mode = page.selectors().has_rows(),
        "Extracting records"
    );
    let context = PageContext::new(page.id(), unit_label);

    let document = Html::parse_document(&rendered.html);
    let mut result = PageRecords::default();
    for raw in extract(&document, page.selectors()) {
        match normalize(&raw, &context, extracted_at) {
            Ok(record) => result.records.push(record),
            Err(e) => {
                warn!(
                    target: "errata::normalize",
                    page = %page.id(),
                    field = e.field(),
                    description = %safe_truncate_chars(&raw.improvement_description, 60),
                    "Dropping record: {e}"
                );
                result.dropped += 1;
            }
        }
    }
    result
}

//! Pipeline orchestration with scripted authenticator and renderer

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use errata_locator::config::PageSpec;
use errata_locator::{
    AuthError, Authenticator, Credentials, ErrataConfig, ErrataError, FetchError, MergeMode,
    Pipeline, RenderedPage, Renderer, RunOutcome, Session,
};
use tempfile::TempDir;

mod common;

use common::{errata_page_html, three_row_page};

struct ScriptedSession {
    generation: usize,
    valid: bool,
    closed: Rc<RefCell<Vec<usize>>>,
}

impl Session for ScriptedSession {
    fn acquired_at(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn verify(&self) -> bool {
        self.valid
    }

    async fn close(self) {
        self.closed.borrow_mut().push(self.generation);
    }
}

/// Counts logins; optionally rejects every login after `max_logins`.
/// Sessions record their generation in `closed` when closed.
#[derive(Default)]
struct ScriptedAuth {
    logins: Cell<usize>,
    max_logins: Option<usize>,
    first_session_invalid: bool,
    closed: Rc<RefCell<Vec<usize>>>,
}

impl Authenticator for ScriptedAuth {
    type Session = ScriptedSession;

    async fn authenticate(&self, _credentials: &Credentials) -> Result<ScriptedSession, AuthError> {
        let generation = self.logins.get() + 1;
        self.logins.set(generation);
        if self.max_logins.is_some_and(|max| generation > max) {
            return Err(AuthError::InvalidCredentials {
                url: "https://curriculum.example.com/login".into(),
                detail: "account locked".into(),
            });
        }
        Ok(ScriptedSession {
            generation,
            valid: !(generation == 1 && self.first_session_invalid),
            closed: Rc::clone(&self.closed),
        })
    }
}

enum Behaviour {
    Html(String),
    Status(u16),
    /// Session expired for logins up to and including this generation
    ExpiredUntil(usize, String),
}

#[derive(Default)]
struct ScriptedRenderer {
    pages: HashMap<String, Behaviour>,
    calls: RefCell<Vec<(String, usize)>>,
}

impl ScriptedRenderer {
    fn with(mut self, path: &str, behaviour: Behaviour) -> Self {
        self.pages.insert(path.to_string(), behaviour);
        self
    }
}

impl Renderer for ScriptedRenderer {
    type Session = ScriptedSession;

    async fn render(&self, session: &ScriptedSession, page: &PageSpec) -> Result<RenderedPage, FetchError> {
        self.calls
            .borrow_mut()
            .push((page.id().to_string(), session.generation));
        let url = page.url().to_string();
        let ok = |html: &str| RenderedPage {
            url: url.clone(),
            title: None,
            html: html.to_string(),
        };
        match self.pages.get(page.id()) {
            Some(Behaviour::Html(html)) => Ok(ok(html)),
            Some(Behaviour::Status(status)) => Err(FetchError::Status {
                url: url.clone(),
                status: *status,
            }),
            Some(Behaviour::ExpiredUntil(generation, html)) => {
                if session.generation <= *generation {
                    Err(FetchError::SessionExpired { url: url.clone() })
                } else {
                    Ok(ok(html))
                }
            }
            None => Err(FetchError::Status { url: url.clone(), status: 404 }),
        }
    }
}

fn credentials() -> Credentials {
    Credentials::new("teacher", "pw")
}

fn config(dir: &TempDir, pages: &[&str]) -> ErrataConfig {
    common::config_for("https://curriculum.example.com", pages, dir.path())
}

fn other_rows() -> String {
    errata_page_html(
        "Grade 7 Errata",
        &[("Answer Key, Lesson 1, p. 3", "Corrected answer to item 2", "2024-04-20")],
    )
}

#[tokio::test]
async fn test_expired_session_reauthenticates_once_and_retries() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&config(&dir, &["/a", "/b"])).unwrap();
    let auth = ScriptedAuth::default();
    let renderer = ScriptedRenderer::default()
        .with("/a", Behaviour::Html(three_row_page("A")))
        .with("/b", Behaviour::ExpiredUntil(1, other_rows()));

    let report = pipeline
        .run(&auth, &renderer, &credentials(), MergeMode::Full)
        .await
        .unwrap();

    assert_eq!(auth.logins.get(), 2);
    assert_eq!(report.reauthentications, 1);
    assert_eq!(report.pages_succeeded(), 2);
    assert_eq!(report.outcome, RunOutcome::Updated);
    assert_eq!(report.merge.unwrap().written, 3);
    assert_eq!(
        *renderer.calls.borrow(),
        vec![("/a".to_string(), 1), ("/b".to_string(), 1), ("/b".to_string(), 2)]
    );
    // The expired session is closed when replaced, the fresh one at the end
    assert_eq!(*auth.closed.borrow(), vec![1, 2]);
}

#[tokio::test]
async fn test_failed_reauthentication_aborts_run() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &["/a"]);
    let pipeline = Pipeline::new(&cfg).unwrap();
    let auth = ScriptedAuth {
        max_logins: Some(1),
        ..ScriptedAuth::default()
    };
    let renderer = ScriptedRenderer::default().with("/a", Behaviour::ExpiredUntil(5, three_row_page("A")));

    let err = pipeline
        .run(&auth, &renderer, &credentials(), MergeMode::Full)
        .await
        .unwrap_err();

    assert!(matches!(err, ErrataError::Auth(AuthError::InvalidCredentials { .. })), "{err}");
    assert!(err.is_fatal());
    assert!(!cfg.csv_path().exists());
    assert_eq!(*auth.closed.borrow(), vec![1]);
}

#[tokio::test]
async fn test_unverified_fresh_session_logs_in_again() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&config(&dir, &["/a"])).unwrap();
    let auth = ScriptedAuth {
        first_session_invalid: true,
        ..ScriptedAuth::default()
    };
    let renderer = ScriptedRenderer::default().with("/a", Behaviour::Html(three_row_page("A")));

    let collected = pipeline.collect(&auth, &renderer, &credentials()).await.unwrap();

    assert_eq!(auth.logins.get(), 2);
    assert_eq!(collected.reauthentications, 1);
    assert_eq!(collected.records.len(), 2);
    assert_eq!(collected.dropped_invalid, 1);
    assert_eq!(*auth.closed.borrow(), vec![1, 2]);
}

#[tokio::test]
async fn test_all_pages_failed_leaves_dataset_untouched() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &["/a", "/b"]);
    std::fs::write(cfg.csv_path(), "Unit\nkeep me\n").unwrap();
    let pipeline = Pipeline::new(&cfg).unwrap();
    let renderer = ScriptedRenderer::default()
        .with("/a", Behaviour::Status(500))
        .with("/b", Behaviour::Status(502));

    let report = pipeline
        .run(&ScriptedAuth::default(), &renderer, &credentials(), MergeMode::Full)
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::AllPagesFailed);
    assert!(!report.is_success());
    assert!(report.merge.is_none());
    assert!(report.backup.is_none());
    assert_eq!(std::fs::read_to_string(cfg.csv_path()).unwrap(), "Unit\nkeep me\n");
}

#[tokio::test]
async fn test_repeat_incremental_run_reports_no_changes() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &["/a"]);
    let pipeline = Pipeline::new(&cfg).unwrap();
    let renderer = ScriptedRenderer::default().with("/a", Behaviour::Html(three_row_page("A")));

    let first = pipeline
        .run(&ScriptedAuth::default(), &renderer, &credentials(), MergeMode::Incremental)
        .await
        .unwrap();
    assert_eq!(first.outcome, RunOutcome::Updated);

    let second = pipeline
        .run(&ScriptedAuth::default(), &renderer, &credentials(), MergeMode::Incremental)
        .await
        .unwrap();
    assert_eq!(second.outcome, RunOutcome::NoChanges);
    assert!(second.is_success());
    assert!(!second.dataset_rewritten);
    assert_eq!(second.merge.unwrap().skipped_duplicate, 2);
}

#[tokio::test]
async fn test_pages_without_records_report_no_records_found() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &["/empty"]);
    let pipeline = Pipeline::new(&cfg).unwrap();
    let renderer = ScriptedRenderer::default().with(
        "/empty",
        Behaviour::Html("<html><body><p>No errata yet</p></body></html>".to_string()),
    );

    let report = pipeline
        .run(&ScriptedAuth::default(), &renderer, &credentials(), MergeMode::Full)
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::NoRecordsFound);
    assert!(report.is_success());
    let text = std::fs::read_to_string(cfg.csv_path()).unwrap();
    assert_eq!(text.lines().count(), 1, "header only");
}

#[tokio::test]
async fn test_summary_file_written_next_to_dataset() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, &["/a", "/missing"]);
    let pipeline = Pipeline::new(&cfg).unwrap();
    let renderer = ScriptedRenderer::default().with("/a", Behaviour::Html(three_row_page("A")));

    let report = pipeline
        .run(&ScriptedAuth::default(), &renderer, &credentials(), MergeMode::Full)
        .await
        .unwrap();

    let path = report.summary_path.clone().unwrap();
    assert_eq!(path, dir.path().join("extraction_summary.txt"));
    let summary = std::fs::read_to_string(path).unwrap();
    assert!(summary.contains("Pages: 2 attempted, 1 succeeded, 1 failed"), "{summary}");
    assert!(summary.contains("Records by Resource:"));
    assert!(summary.contains("Teacher Guide: 1"));
    assert!(summary.contains("[failed] /missing"));
}

#[tokio::test]
async fn test_summary_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let cfg = ErrataConfig::builder()
        .base_url("https://curriculum.example.com")
        .page("/a")
        .selector("errata_container", ".errata-section")
        .selector("table_rows", "tbody tr")
        .csv_path(dir.path().join("errata.csv"))
        .write_summary(false)
        .delay_between_requests_ms(0)
        .build()
        .unwrap();
    let pipeline = Pipeline::new(&cfg).unwrap();
    let renderer = ScriptedRenderer::default().with("/a", Behaviour::Html(three_row_page("A")));

    let report = pipeline
        .run(&ScriptedAuth::default(), &renderer, &credentials(), MergeMode::Full)
        .await
        .unwrap();
    assert!(report.summary_path.is_none());
    assert!(!dir.path().join("extraction_summary.txt").exists());
}

#[tokio::test(start_paused = true)]
async fn test_requests_are_paced() {
    let dir = TempDir::new().unwrap();
    let cfg = ErrataConfig::builder()
        .base_url("https://curriculum.example.com")
        .page("/a")
        .page("/b")
        .page("/c")
        .selector("errata_container", ".errata-section")
        .csv_path(dir.path().join("errata.csv"))
        .delay_between_requests_ms(500)
        .build()
        .unwrap();
    let pipeline = Pipeline::new(&cfg).unwrap();
    let renderer = ScriptedRenderer::default()
        .with("/a", Behaviour::Html(String::new()))
        .with("/b", Behaviour::Html(String::new()))
        .with("/c", Behaviour::Html(String::new()));

    let start = tokio::time::Instant::now();
    pipeline
        .collect(&ScriptedAuth::default(), &renderer, &credentials())
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_auth_check_fetches_first_page_only() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&config(&dir, &["/a", "/b"])).unwrap();
    let renderer = ScriptedRenderer::default()
        .with("/a", Behaviour::Html(three_row_page("A")))
        .with("/b", Behaviour::Html(three_row_page("B")));

    let auth = ScriptedAuth::default();
    let check = pipeline.probe(&auth, &renderer, &credentials()).await.unwrap();

    assert!(check.verified);
    assert_eq!(check.page_id, "/a");
    assert!(check.html_bytes > 0);
    assert_eq!(renderer.calls.borrow().len(), 1);
    assert_eq!(*auth.closed.borrow(), vec![1]);
    assert!(!dir.path().join("errata_changes.csv").exists());
}

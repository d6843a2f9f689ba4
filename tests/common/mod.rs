//! Shared fixtures for the integration tests

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use errata_locator::ErrataConfig;
use errata_locator::RawRecord;

/// Fixed processing time so extracted records compare equal across runs
#[allow(dead_code)]
pub fn processing_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .expect("valid fixture time")
}

/// Errata page with one section and a three-column (Component, Description,
/// Date) table
#[allow(dead_code)]
pub fn errata_page_html(title: &str, rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(component, description, date)| {
            format!("<tr><td>{component}</td><td>{description}</td><td>{date}</td></tr>\n")
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>{title}</title></head>
<body>
  <section class="errata-section">
    <h2 class="unit-title">Unit 2: Ratios</h2>
    <table>
      <thead><tr><th>Component</th><th>Description</th><th>Date</th></tr></thead>
      <tbody>
{body}      </tbody>
    </table>
  </section>
</body>
</html>"#
    )
}

/// The three-row scenario: two valid rows and one unparsable date
#[allow(dead_code)]
pub fn three_row_page(title: &str) -> String {
    errata_page_html(
        title,
        &[
            (
                "Teacher Guide, Lesson 3 Section A, pp. 12-15",
                "Corrected the answer to problem 4",
                "03/14/2024",
            ),
            ("Student Workbook, Lesson 5, p. 7", "Fixed a typo in the directions", "2024-04-01"),
            ("Assessment, Unit Test", "Updated rubric wording", "sometime soon"),
        ],
    )
}

/// Login page with a CSRF token and a password form posting to `/session`
#[allow(dead_code)]
pub fn login_page_html(token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign in</title></head>
<body>
  <form action="/session" method="post">
    <input type="hidden" name="authenticity_token" value="{token}">
    <input type="text" name="username">
    <input type="password" name="password">
    <button type="submit">Sign in</button>
  </form>
</body>
</html>"#
    )
}

/// Page shown after a successful login
#[allow(dead_code)]
pub const DASHBOARD_HTML: &str =
    r#"<html><head><title>Dashboard</title></head><body><a href="/logout">Log out</a></body></html>"#;

/// Config for a site at `base_url` with the given pages, writing into `out_dir`
#[allow(dead_code)]
pub fn config_for(base_url: &str, pages: &[&str], out_dir: &Path) -> ErrataConfig {
    let mut builder = ErrataConfig::builder()
        .base_url(base_url)
        .login_url("/login")
        .selector("errata_container", ".errata-section")
        .selector("unit_field", ".unit-title")
        .selector("table_rows", "tbody tr")
        .csv_path(out_dir.join("errata_changes.csv"))
        .backup_path(out_dir.join("backups"))
        .delay_between_requests_ms(0)
        .request_timeout_secs(5)
        .page_timeout_secs(5);
    for page in pages {
        builder = builder.page(*page);
    }
    builder.build().expect("fixture config is valid")
}

/// Raw record with only a description and a date
#[allow(dead_code)]
pub fn raw(description: &str, date: &str) -> RawRecord {
    RawRecord {
        improvement_description: description.to_string(),
        date_updated: date.to_string(),
        ..RawRecord::default()
    }
}

//! Getter methods for `ErrataConfig`

use std::path::Path;
use std::time::Duration;

use super::types::{ErrataConfig, PageEntry};

impl ErrataConfig {
    #[must_use]
    pub fn errata_pages(&self) -> &[PageEntry] {
        &self.website.errata_pages
    }

    #[must_use]
    pub fn username_field(&self) -> &str {
        &self.login.username_field
    }

    #[must_use]
    pub fn password_field(&self) -> &str {
        &self.login.password_field
    }

    #[must_use]
    pub fn login_form_selector(&self) -> &str {
        &self.login.form_selector
    }

    #[must_use]
    pub fn username_input(&self) -> &str {
        &self.login.username_input
    }

    #[must_use]
    pub fn password_input(&self) -> &str {
        &self.login.password_input
    }

    #[must_use]
    pub fn success_indicator(&self) -> Option<&str> {
        self.login
            .success_indicator
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    #[must_use]
    pub fn csv_path(&self) -> &Path {
        &self.output.csv_path
    }

    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.output.backup_path
    }

    #[must_use]
    pub fn write_summary(&self) -> bool {
        self.output.write_summary
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.scraping.user_agent
    }

    #[must_use]
    pub fn delay_between_requests(&self) -> Duration {
        Duration::from_millis(self.scraping.delay_between_requests_ms)
    }

    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.scraping.page_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scraping.request_timeout_secs)
    }

    #[must_use]
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.scraping.login_timeout_secs)
    }

    #[must_use]
    pub fn accordion_timeout(&self) -> Duration {
        Duration::from_secs(self.scraping.accordion_timeout_secs)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.scraping.headless
    }

    #[must_use]
    pub fn accept_invalid_certs(&self) -> bool {
        self.scraping.accept_invalid_certs
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&Path> {
        self.scraping.chrome_executable.as_deref()
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.logging.file.as_deref()
    }
}

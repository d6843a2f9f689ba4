//! Type-safe builder for `ErrataConfig` using the typestate pattern
//!
//! `build()` only exists once a base URL is set, and it runs the same
//! validation as a YAML load.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{ErrataConfig, PageEntry};
use crate::errors::ConfigError;

// Type states for the builder
pub struct WithBaseUrl;

pub struct ErrataConfigBuilder<State = ()> {
    pub(crate) config: ErrataConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ErrataConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: ErrataConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl ErrataConfig {
    #[must_use]
    pub fn builder() -> ErrataConfigBuilder<()> {
        ErrataConfigBuilder::default()
    }
}

impl ErrataConfigBuilder<()> {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> ErrataConfigBuilder<WithBaseUrl> {
        self.config.website.base_url = url.into();
        ErrataConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl ErrataConfigBuilder<WithBaseUrl> {
    /// Validate and return the configuration
    pub fn build(self) -> Result<ErrataConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl<State> ErrataConfigBuilder<State> {
    #[must_use]
    pub fn login_url(mut self, path: impl Into<String>) -> Self {
        self.config.website.login_url = path.into();
        self
    }

    /// Add a page by path
    #[must_use]
    pub fn page(mut self, path: impl Into<String>) -> Self {
        self.config.website.errata_pages.push(PageEntry::Path(path.into()));
        self
    }

    /// Add a page with an explicit unit label
    #[must_use]
    pub fn page_with_unit(mut self, path: impl Into<String>, unit: impl Into<String>) -> Self {
        self.config.website.errata_pages.push(PageEntry::Detailed {
            path: path.into(),
            unit: Some(unit.into()),
            selectors: None,
        });
        self
    }

    /// Set a global selector
    #[must_use]
    pub fn selector(mut self, key: impl Into<String>, css: impl Into<String>) -> Self {
        self.config.selectors.insert(key.into(), css.into());
        self
    }

    #[must_use]
    pub fn username_field(mut self, name: impl Into<String>) -> Self {
        self.config.login.username_field = name.into();
        self
    }

    #[must_use]
    pub fn password_field(mut self, name: impl Into<String>) -> Self {
        self.config.login.password_field = name.into();
        self
    }

    #[must_use]
    pub fn success_indicator(mut self, text: impl Into<String>) -> Self {
        self.config.login.success_indicator = Some(text.into());
        self
    }

    #[must_use]
    pub fn csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output.csv_path = path.into();
        self
    }

    #[must_use]
    pub fn backup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output.backup_path = path.into();
        self
    }

    #[must_use]
    pub fn csv_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.output.csv_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn write_summary(mut self, enabled: bool) -> Self {
        self.config.output.write_summary = enabled;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.scraping.user_agent = agent.into();
        self
    }

    #[must_use]
    pub fn delay_between_requests_ms(mut self, ms: u64) -> Self {
        self.config.scraping.delay_between_requests_ms = ms;
        self
    }

    #[must_use]
    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.config.scraping.page_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.scraping.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.scraping.headless = headless;
        self
    }

    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.scraping.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }
}

//! Loading and validation of `ErrataConfig`

use std::path::Path;
use std::str::FromStr;

use scraper::Selector;
use tracing::debug;
use url::Url;

use super::page::PageSpec;
use super::types::{ErrataConfig, PageEntry};
use crate::dataset::Column;
use crate::errors::ConfigError;
use crate::extract::SelectorSet;
use crate::utils::join_site_url;

impl ErrataConfig {
    /// Read and validate a YAML configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        debug!(target: "errata::pipeline", path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ErrataConfig =
            serde_yml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every key that would otherwise fail later, mid-run.
    ///
    /// Compiles all selectors (global, per page and login), resolves every
    /// page URL and checks the column list against the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.login_url()?;
        self.page_specs()?;
        self.columns()?;

        for (key, css) in [
            ("login.form_selector", &self.login.form_selector),
            ("login.username_input", &self.login.username_input),
            ("login.password_input", &self.login.password_input),
        ] {
            if css.trim().is_empty() {
                return Err(ConfigError::MissingKey(key.to_string()));
            }
            Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
                key: key.to_string(),
                selector: css.clone(),
                message: e.to_string(),
            })?;
        }

        if self.output.csv_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey("output.csv_path".to_string()));
        }
        if self.scraping.page_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "scraping.page_timeout_secs",
                "must be greater than zero",
            ));
        }
        tracing::Level::from_str(self.logging.level.trim()).map_err(|_| {
            ConfigError::invalid(
                "logging.level",
                format!(
                    "'{}' is not one of trace, debug, info, warn, error",
                    self.logging.level
                ),
            )
        })?;

        Ok(())
    }

    /// Site base URL
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.website.base_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingKey("website.base_url".to_string()));
        }
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::invalid("website.base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "website.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Absolute login URL
    pub fn login_url(&self) -> Result<Url, ConfigError> {
        join_site_url(&self.website.base_url, &self.website.login_url)
            .map_err(|e| ConfigError::invalid("website.login_url", e.to_string()))
    }

    /// Resolve every configured page, compiling its selector set.
    ///
    /// Page-level selectors override the global mapping key by key.
    pub fn page_specs(&self) -> Result<Vec<PageSpec>, ConfigError> {
        if self.website.errata_pages.is_empty() {
            return Err(ConfigError::MissingKey("website.errata_pages".to_string()));
        }

        let global = SelectorSet::compile(&self.selectors, "selectors.")?;
        let base = self.base_url()?;

        self.website
            .errata_pages
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let path = entry.path().trim();
                if path.is_empty() {
                    return Err(ConfigError::MissingKey(format!(
                        "website.errata_pages[{i}].path"
                    )));
                }
                let url = join_site_url(base.as_str(), path).map_err(|e| {
                    ConfigError::invalid(format!("website.errata_pages[{i}]"), e.to_string())
                })?;

                match entry {
                    PageEntry::Path(_) => Ok(PageSpec::new(path, url, None, global.clone())),
                    PageEntry::Detailed {
                        unit, selectors, ..
                    } => {
                        let selectors = match selectors {
                            Some(overrides) if !overrides.is_empty() => {
                                let mut merged = self.selectors.clone();
                                merged.extend(overrides.clone());
                                SelectorSet::compile(
                                    &merged,
                                    &format!("website.errata_pages[{i}].selectors."),
                                )?
                            }
                            _ => global.clone(),
                        };
                        let unit = unit
                            .as_deref()
                            .map(str::trim)
                            .filter(|u| !u.is_empty())
                            .map(str::to_string);
                        Ok(PageSpec::new(path, url, unit, selectors))
                    }
                }
            })
            .collect()
    }

    /// Output column order
    pub fn columns(&self) -> Result<Vec<Column>, ConfigError> {
        if self.output.csv_columns.is_empty() {
            return Err(ConfigError::MissingKey("output.csv_columns".to_string()));
        }

        let mut columns = Vec::with_capacity(self.output.csv_columns.len());
        for name in &self.output.csv_columns {
            let column = name
                .parse::<Column>()
                .map_err(|e| ConfigError::invalid("output.csv_columns", e.to_string()))?;
            if columns.contains(&column) {
                return Err(ConfigError::invalid(
                    "output.csv_columns",
                    format!("column '{column}' listed twice"),
                ));
            }
            columns.push(column);
        }
        Ok(columns)
    }
}

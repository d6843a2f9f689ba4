//! Configuration types
//!
//! Mirrors the YAML layout section by section. Everything has a default
//! except the site base URL, the page list and the container selector;
//! [`ErrataConfig::validate`](super::ErrataConfig::validate) reports those by key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_ACCORDION_TIMEOUT_SECS, DEFAULT_BACKUP_DIR, DEFAULT_CSV_PATH,
    DEFAULT_DELAY_BETWEEN_REQUESTS_MS, DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_PAGE_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrataConfig {
    pub(crate) website: WebsiteConfig,
    pub(crate) login: LoginConfig,
    pub(crate) selectors: BTreeMap<String, String>,
    pub(crate) output: OutputConfig,
    pub(crate) scraping: ScrapingConfig,
    pub(crate) logging: LoggingConfig,
}

/// `website.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    pub(crate) base_url: String,
    pub(crate) login_url: String,
    pub(crate) errata_pages: Vec<PageEntry>,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            login_url: "/login".to_string(),
            errata_pages: Vec::new(),
        }
    }
}

/// One entry of `website.errata_pages`: a bare path, or a map with an
/// optional unit label and selector overrides
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PageEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        unit: Option<String>,
        #[serde(default)]
        selectors: Option<BTreeMap<String, String>>,
    },
}

impl PageEntry {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            PageEntry::Path(path) | PageEntry::Detailed { path, .. } => path,
        }
    }
}

/// `login.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Form field name for the username (HTTP strategy)
    pub(crate) username_field: String,
    /// Form field name for the password (HTTP strategy)
    pub(crate) password_field: String,
    /// Element that signals the login form has rendered (browser strategy)
    pub(crate) form_selector: String,
    /// Username input (browser strategy)
    pub(crate) username_input: String,
    /// Password input (browser strategy)
    pub(crate) password_input: String,
    /// Text whose presence in the post-login page confirms success
    pub(crate) success_indicator: Option<String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            username_field: "username".to_string(),
            password_field: "password".to_string(),
            form_selector: "form".to_string(),
            username_input: "input[name='username'], input[name='auth_key'], input[type='email']"
                .to_string(),
            password_input: "input[type='password']".to_string(),
            success_indicator: None,
        }
    }
}

/// `output.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub(crate) csv_path: PathBuf,
    pub(crate) backup_path: PathBuf,
    pub(crate) csv_columns: Vec<String>,
    /// Write `extraction_summary.txt` next to the CSV after each run
    pub(crate) write_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            backup_path: PathBuf::from(DEFAULT_BACKUP_DIR),
            csv_columns: crate::dataset::Column::ALL
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            write_summary: true,
        }
    }
}

/// `scraping.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub(crate) user_agent: String,
    pub(crate) delay_between_requests_ms: u64,
    pub(crate) page_timeout_secs: u64,
    pub(crate) request_timeout_secs: u64,
    pub(crate) login_timeout_secs: u64,
    pub(crate) accordion_timeout_secs: u64,
    pub(crate) headless: bool,
    /// Accept self-signed or intercepted TLS certificates (corporate proxies)
    pub(crate) accept_invalid_certs: bool,
    /// Browser executable; discovered automatically when unset
    pub(crate) chrome_executable: Option<PathBuf>,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: CHROME_USER_AGENT.to_string(),
            delay_between_requests_ms: DEFAULT_DELAY_BETWEEN_REQUESTS_MS,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            accordion_timeout_secs: DEFAULT_ACCORDION_TIMEOUT_SECS,
            headless: true,
            accept_invalid_certs: false,
            chrome_executable: None,
        }
    }
}

/// `logging.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub(crate) level: String,
    pub(crate) file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

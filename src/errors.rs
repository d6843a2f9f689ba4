//! Error taxonomy for the extraction pipeline
//!
//! Each error family maps to one recovery policy:
//! - [`ConfigError`] is fatal and raised before any network activity
//! - [`AuthError`] is fatal for the run, no page can be fetched without a session
//! - [`FetchError`] is per page; the page is skipped, except that
//!   [`FetchError::SessionExpired`] triggers a single re-authentication
//! - [`ValidationError`] is per record; the record is dropped

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type ErrataResult<T> = Result<T, ErrataError>;

/// Configuration is missing a key or carries an invalid value
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is absent or empty
    #[error("missing required configuration key '{0}'")]
    MissingKey(String),

    /// A key is present but its value cannot be used
    #[error("invalid value for configuration key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A configured CSS selector does not parse
    #[error("invalid CSS selector for '{key}' ({selector}): {message}")]
    InvalidSelector {
        key: String,
        selector: String,
        message: String,
    },

    /// Credentials were not found in the environment
    #[error("credentials not found: set {0}")]
    MissingCredentials(String),

    /// Configuration file could not be read
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML for the expected shape
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Login failed
#[derive(Debug, Error)]
pub enum AuthError {
    /// The site rejected the credentials
    #[error("login rejected by {url}: {detail}")]
    InvalidCredentials { url: String, detail: String },

    /// The login host could not be reached
    #[error("login host unreachable ({url}): {detail}")]
    Unreachable { url: String, detail: String },

    /// The login page no longer has the expected form elements.
    /// This signals a site-structure change rather than bad credentials.
    #[error("login form element '{element}' not found on {url}; the site structure may have changed")]
    LoginFormMissing { url: String, element: String },

    /// A login step exceeded its time budget
    #[error("login step '{step}' timed out after {timeout:?}")]
    Timeout { step: String, timeout: Duration },

    /// Browser could not be driven through the login flow
    #[error("browser error during login: {0}")]
    Browser(String),
}

/// A single page could not be fetched or rendered
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with an error status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Fetch or render exceeded the per-page timeout
    #[error("{operation} timed out after {timeout:?} for {url}")]
    Timeout {
        url: String,
        operation: String,
        timeout: Duration,
    },

    /// The site no longer accepts the session
    #[error("session expired while fetching {url}")]
    SessionExpired { url: String },

    /// Network-level failure
    #[error("transport error fetching {url}: {detail}")]
    Transport { url: String, detail: String },

    /// Browser automation failure
    #[error("browser error rendering {url}: {detail}")]
    Browser { url: String, detail: String },
}

impl FetchError {
    /// Whether the caller should re-authenticate and retry this page once
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, FetchError::SessionExpired { .. })
    }

    /// URL of the page that failed
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::SessionExpired { url }
            | FetchError::Transport { url, .. }
            | FetchError::Browser { url, .. } => url,
        }
    }
}

/// A raw record could not be normalized into the canonical schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A date field holds text in none of the accepted formats
    #[error("field '{field}' has unparsable date '{value}'")]
    InvalidDate { field: &'static str, value: String },

    /// A field that every record must carry is empty
    #[error("required field '{field}' is empty")]
    MissingField { field: &'static str },
}

impl ValidationError {
    /// Canonical column name of the offending field
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidDate { field, .. } | ValidationError::MissingField { field } => {
                field
            }
        }
    }
}

/// Umbrella error for whole-run operations
#[derive(Debug, Error)]
pub enum ErrataError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Dataset read/write failure
    #[error("dataset error: {0}")]
    Dataset(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ErrataError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        ErrataError::Other(format!("{err:#}"))
    }
}

impl ErrataError {
    /// Whether this error aborted the run rather than a single page or record
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrataError::Fetch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expiry_is_distinguishable() {
        let expired = FetchError::SessionExpired {
            url: "https://example.com/errata".into(),
        };
        let status = FetchError::Status {
            url: "https://example.com/errata".into(),
            status: 500,
        };
        assert!(expired.is_session_expired());
        assert!(!status.is_session_expired());
        assert_eq!(status.url(), "https://example.com/errata");
    }

    #[test]
    fn validation_error_names_field() {
        let err = ValidationError::InvalidDate {
            field: "Date_Updated",
            value: "someday".into(),
        };
        assert_eq!(err.field(), "Date_Updated");
        assert!(err.to_string().contains("someday"));
    }

    #[test]
    fn fetch_errors_are_not_fatal() {
        let err: ErrataError = FetchError::Transport {
            url: "u".into(),
            detail: "reset".into(),
        }
        .into();
        assert!(!err.is_fatal());
        let err: ErrataError = ConfigError::MissingKey("selectors".into()).into();
        assert!(err.is_fatal());
    }
}

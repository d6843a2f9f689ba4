//! Resolved errata page: absolute URL plus the selectors that apply to it

use url::Url;

use crate::extract::SelectorSet;

/// One configured errata page, ready to render and extract
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub(crate) id: String,
    pub(crate) url: Url,
    pub(crate) unit: Option<String>,
    pub(crate) selectors: SelectorSet,
}

impl PageSpec {
    #[must_use]
    pub fn new(id: impl Into<String>, url: Url, unit: Option<String>, selectors: SelectorSet) -> Self {
        Self {
            id: id.into(),
            url,
            unit,
            selectors,
        }
    }

    /// Configured path, used as the page identifier in logs and reports
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Explicit unit label, if configured
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[must_use]
    pub fn selectors(&self) -> &SelectorSet {
        &self.selectors
    }
}

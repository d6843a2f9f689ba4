//! Named CSS selectors, compiled once at configuration time

use std::collections::BTreeMap;

use scraper::Selector;

use crate::errors::ConfigError;

/// Selector configuration keys
pub mod keys {
    pub const ERRATA_CONTAINER: &str = "errata_container";
    pub const TABLE_ROWS: &str = "table_rows";
    pub const UNIT_FIELD: &str = "unit_field";
    pub const RESOURCE_FIELD: &str = "resource_field";
    pub const LOCATION_FIELD: &str = "location_field";
    pub const INSTRUCTIONAL_MOMENT_FIELD: &str = "instructional_moment_field";
    pub const PAGE_NUMBERS: &str = "page_numbers";
    pub const IMPROVEMENT_DESCRIPTION: &str = "improvement_description";
    pub const IMPROVEMENT_TYPE: &str = "improvement_type";
    pub const DATE_UPDATED: &str = "date_updated";
    pub const ACCORDION_TOGGLE: &str = "accordion_toggle";

    pub const ALL: [&str; 11] = [
        ERRATA_CONTAINER,
        TABLE_ROWS,
        UNIT_FIELD,
        RESOURCE_FIELD,
        LOCATION_FIELD,
        INSTRUCTIONAL_MOMENT_FIELD,
        PAGE_NUMBERS,
        IMPROVEMENT_DESCRIPTION,
        IMPROVEMENT_TYPE,
        DATE_UPDATED,
        ACCORDION_TOGGLE,
    ];
}

/// Toggle selector used when `accordion_toggle` is not configured
pub const DEFAULT_ACCORDION_TOGGLE: &str = "button[aria-expanded]";

/// Compiled selector set for one page.
///
/// Every field except the container is optional; an absent selector yields an
/// empty string for that field on every record.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub(crate) container: Selector,
    pub(crate) table_rows: Option<Selector>,
    pub(crate) unit: Option<Selector>,
    pub(crate) resource: Option<Selector>,
    pub(crate) location: Option<Selector>,
    pub(crate) instructional_moment: Option<Selector>,
    pub(crate) page_numbers: Option<Selector>,
    pub(crate) improvement_description: Option<Selector>,
    pub(crate) improvement_type: Option<Selector>,
    pub(crate) date_updated: Option<Selector>,
    accordion_toggle: String,
}

impl SelectorSet {
    /// Compile a selector mapping. `key_prefix` is prepended to key names in
    /// errors so the caller can point at the exact configuration entry.
    pub fn compile(
        map: &BTreeMap<String, String>,
        key_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| -> Result<Option<Selector>, ConfigError> {
            match map.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(raw) => Selector::parse(raw).map(Some).map_err(|e| {
                    ConfigError::InvalidSelector {
                        key: format!("{key_prefix}{key}"),
                        selector: raw.to_string(),
                        message: e.to_string(),
                    }
                }),
            }
        };

        let container = lookup(keys::ERRATA_CONTAINER)?.ok_or_else(|| {
            ConfigError::MissingKey(format!("{key_prefix}{}", keys::ERRATA_CONTAINER))
        })?;

        // The toggle selector runs inside the page via querySelectorAll, but
        // it is still validated here so a typo fails before any login.
        let accordion_toggle = match lookup(keys::ACCORDION_TOGGLE)? {
            Some(_) => map
                .get(keys::ACCORDION_TOGGLE)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            None => DEFAULT_ACCORDION_TOGGLE.to_string(),
        };

        Ok(Self {
            container,
            table_rows: lookup(keys::TABLE_ROWS)?,
            unit: lookup(keys::UNIT_FIELD)?,
            resource: lookup(keys::RESOURCE_FIELD)?,
            location: lookup(keys::LOCATION_FIELD)?,
            instructional_moment: lookup(keys::INSTRUCTIONAL_MOMENT_FIELD)?,
            page_numbers: lookup(keys::PAGE_NUMBERS)?,
            improvement_description: lookup(keys::IMPROVEMENT_DESCRIPTION)?,
            improvement_type: lookup(keys::IMPROVEMENT_TYPE)?,
            date_updated: lookup(keys::DATE_UPDATED)?,
            accordion_toggle,
        })
    }

    /// Selector for collapsed-section toggles, as CSS text for the page script
    #[must_use]
    pub fn accordion_toggle(&self) -> &str {
        &self.accordion_toggle
    }

    /// Whether each container holds several records in rows
    #[must_use]
    pub fn has_rows(&self) -> bool {
        self.table_rows.is_some()
    }
}

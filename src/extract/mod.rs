//! Record extraction from rendered markup
//!
//! [`extract`] walks every element matched by `errata_container` and yields one
//! [`RawRecord`] per row (when `table_rows` is configured) or per container.
//! Values are whitespace-collapsed text, nothing more; interpretation is left
//! to [`crate::normalize`].

pub mod selectors;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector, element_ref, html};

use crate::utils::collapse_whitespace;

pub use selectors::{DEFAULT_ACCORDION_TOGGLE, SelectorSet, keys};

static TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("BUG: hardcoded CSS selector 'td' is invalid"));

/// Raw field text for one record, straight from the DOM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub unit: String,
    pub resource: String,
    pub location: String,
    pub instructional_moment: String,
    pub page_numbers: String,
    pub improvement_description: String,
    pub improvement_type: String,
    pub date_updated: String,
    /// First cell of a three-column (Component, Description, Date) row,
    /// unsplit. Present only for that layout.
    pub component: Option<String>,
}

/// Lazily extract records from a parsed document.
///
/// The iterator is single pass and borrows the document; extracting again
/// means calling this again.
#[must_use]
pub fn extract<'a>(document: &'a Html, selectors: &'a SelectorSet) -> Records<'a> {
    Records {
        selectors,
        containers: document.select(&selectors.container),
        current: None,
    }
}

/// Iterator returned by [`extract`]
pub struct Records<'a> {
    selectors: &'a SelectorSet,
    containers: html::Select<'a, 'a>,
    current: Option<RowCursor<'a>>,
}

struct RowCursor<'a> {
    unit: String,
    rows: element_ref::Select<'a, 'a>,
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        let selectors = self.selectors;
        loop {
            if let Some(cursor) = self.current.as_mut() {
                for row in cursor.rows.by_ref() {
                    if let Some(record) = row_record(row, &cursor.unit, selectors) {
                        return Some(record);
                    }
                }
                self.current = None;
            }

            let container = self.containers.next()?;
            match selectors.table_rows.as_ref() {
                Some(rows) => {
                    self.current = Some(RowCursor {
                        unit: first_text(container, selectors.unit.as_ref()),
                        rows: container.select(rows),
                    });
                }
                None => return Some(container_record(container, selectors)),
            }
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_text(scope: ElementRef<'_>, selector: Option<&Selector>) -> String {
    selector
        .and_then(|s| scope.select(s).next())
        .map(element_text)
        .unwrap_or_default()
}

fn container_record(container: ElementRef<'_>, s: &SelectorSet) -> RawRecord {
    RawRecord {
        unit: first_text(container, s.unit.as_ref()),
        resource: first_text(container, s.resource.as_ref()),
        location: first_text(container, s.location.as_ref()),
        instructional_moment: first_text(container, s.instructional_moment.as_ref()),
        page_numbers: first_text(container, s.page_numbers.as_ref()),
        improvement_description: first_text(container, s.improvement_description.as_ref()),
        improvement_type: first_text(container, s.improvement_type.as_ref()),
        date_updated: first_text(container, s.date_updated.as_ref()),
        component: None,
    }
}

fn row_record(row: ElementRef<'_>, unit: &str, s: &SelectorSet) -> Option<RawRecord> {
    let cells: Vec<String> = row.select(&TD).map(element_text).collect();

    let mut record = RawRecord {
        unit: unit.to_string(),
        resource: first_text(row, s.resource.as_ref()),
        location: first_text(row, s.location.as_ref()),
        instructional_moment: first_text(row, s.instructional_moment.as_ref()),
        page_numbers: first_text(row, s.page_numbers.as_ref()),
        improvement_description: first_text(row, s.improvement_description.as_ref()),
        improvement_type: first_text(row, s.improvement_type.as_ref()),
        date_updated: first_text(row, s.date_updated.as_ref()),
        component: None,
    };

    // Header rows carry only <th>; non-table rows are kept when a field matched
    if cells.is_empty() {
        let matched_any = [
            &record.resource,
            &record.location,
            &record.instructional_moment,
            &record.page_numbers,
            &record.improvement_description,
            &record.improvement_type,
            &record.date_updated,
        ]
        .iter()
        .any(|v| !v.is_empty());
        return matched_any.then_some(record);
    }

    let packed = cells.len() >= 3
        && record.resource.is_empty()
        && record.location.is_empty()
        && record.page_numbers.is_empty();

    if packed {
        let mut cells = cells.into_iter();
        record.component = cells.next();
        if let Some(description) = cells.next()
            && record.improvement_description.is_empty()
        {
            record.improvement_description = description;
        }
        if let Some(date) = cells.next()
            && record.date_updated.is_empty()
        {
            record.date_updated = date;
        }
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn selectors(pairs: &[(&str, &str)]) -> SelectorSet {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SelectorSet::compile(&map, "selectors.").unwrap()
    }

    #[test]
    fn missing_selector_yields_empty_field() {
        let html = Html::parse_document(
            r#"<div class="erratum"><p class="desc">Fixed answer key</p></div>"#,
        );
        let set = selectors(&[("errata_container", ".erratum"), ("improvement_description", ".desc")]);
        let records: Vec<_> = extract(&html, &set).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].improvement_description, "Fixed answer key");
        assert_eq!(records[0].resource, "");
        assert_eq!(records[0].component, None);
    }

    #[test]
    fn iterator_is_lazy_and_finite() {
        let html = Html::parse_document(
            r#"<table class="t"><tr><td>a</td></tr><tr><td>b</td></tr></table>"#,
        );
        let set = selectors(&[
            ("errata_container", "table.t"),
            ("table_rows", "tr"),
            ("improvement_description", "td"),
        ]);
        let mut records = extract(&html, &set);
        assert_eq!(records.next().map(|r| r.improvement_description), Some("a".into()));
        assert_eq!(records.next().map(|r| r.improvement_description), Some("b".into()));
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }
}

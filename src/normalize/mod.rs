//! Field normalization: raw DOM text into [`ErrataRecord`]s
//!
//! [`normalize`] is a pure function of its inputs; the processing time is
//! passed in so repeated calls with the same arguments agree.

pub mod component;
pub mod dates;
pub mod labels;
pub mod pages;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::dataset::{Column, ErrataRecord};
use crate::errors::ValidationError;
use crate::extract::RawRecord;
use crate::utils::{EXTRACTED_AT_FORMAT, collapse_whitespace, safe_truncate_chars};

pub use component::{ComponentSplit, SplitConfidence, split_component};
pub use dates::{normalize_date, parse_source_date};
pub use labels::derive_page_label;
pub use pages::normalize_page_numbers;

/// Page-level facts the normalizer needs for every record on that page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Identifier used in log lines (the configured page path)
    pub page_id: String,
    /// Unit used when a record carries no unit text of its own
    pub unit_label: String,
}

impl PageContext {
    #[must_use]
    pub fn new(page_id: impl Into<String>, unit_label: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            unit_label: unit_label.into(),
        }
    }
}

/// Normalize one raw record.
///
/// # Errors
/// - [`ValidationError::MissingField`] when the improvement description is empty
/// - [`ValidationError::InvalidDate`] when `date_updated` is non-empty and unparsable
pub fn normalize(
    raw: &RawRecord,
    context: &PageContext,
    extracted_at: NaiveDateTime,
) -> Result<ErrataRecord, ValidationError> {
    let improvement_description = collapse_whitespace(&raw.improvement_description);
    if improvement_description.is_empty() {
        return Err(ValidationError::MissingField {
            field: Column::ImprovementDescription.as_str(),
        });
    }

    let date_updated =
        normalize_date(&raw.date_updated).map_err(|_| ValidationError::InvalidDate {
            field: Column::DateUpdated.as_str(),
            value: raw.date_updated.trim().to_string(),
        })?;

    let mut resource = collapse_whitespace(&raw.resource);
    let mut location = collapse_whitespace(&raw.location);
    let mut page_numbers = normalize_page_numbers(&raw.page_numbers);

    if let Some(component) = raw.component.as_deref() {
        let split = split_component(component);
        match split.confidence {
            SplitConfidence::Recognized => {}
            SplitConfidence::Partial => debug!(
                target: "errata::normalize",
                page = %context.page_id,
                component = %safe_truncate_chars(component, 80),
                resource = %split.resource,
                "Component split only partially recognised"
            ),
            SplitConfidence::Unrecognized => warn!(
                target: "errata::normalize",
                page = %context.page_id,
                component = %safe_truncate_chars(component, 80),
                "Component not recognised, stored as Location"
            ),
        }
        if resource.is_empty() {
            resource = split.resource;
        }
        if location.is_empty() {
            location = split.location;
        }
        if page_numbers.is_empty() {
            page_numbers = split.page_numbers;
        }
    }

    let unit = match collapse_whitespace(&raw.unit) {
        own if !own.is_empty() => own,
        _ => context.unit_label.clone(),
    };

    Ok(ErrataRecord {
        date_extracted: extracted_at.format(EXTRACTED_AT_FORMAT).to_string(),
        unit,
        resource,
        location,
        instructional_moment: collapse_whitespace(&raw.instructional_moment),
        page_numbers,
        improvement_description,
        improvement_type: collapse_whitespace(&raw.improvement_type),
        date_updated,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    fn context() -> PageContext {
        PageContext::new("/errata/grade-3", "Grade 3")
    }

    #[test]
    fn packed_component_is_split() {
        let raw = RawRecord {
            unit: "Unit 2: Fractions".into(),
            improvement_description: "Corrected  the answer\n to problem 4".into(),
            date_updated: "Updated 3/14/2024".into(),
            component: Some("Teacher Guide, Lesson 3 Section A, pp. 12-15".into()),
            ..Default::default()
        };
        let record = normalize(&raw, &context(), at()).unwrap();
        assert_eq!(record.date_extracted(), "2024-05-01 09:30:00");
        assert_eq!(record.unit(), "Unit 2: Fractions");
        assert_eq!(record.resource(), "Teacher Guide");
        assert_eq!(record.location(), "Lesson 3 Section A");
        assert_eq!(record.page_numbers(), "12-15");
        assert_eq!(record.improvement_description(), "Corrected the answer to problem 4");
        assert_eq!(record.date_updated(), "2024-03-14");
    }

    #[test]
    fn unit_falls_back_to_page_label() {
        let raw = RawRecord {
            improvement_description: "Typo".into(),
            page_numbers: "12,15".into(),
            improvement_type: "Correction".into(),
            ..Default::default()
        };
        let record = normalize(&raw, &context(), at()).unwrap();
        assert_eq!(record.unit(), "Grade 3");
        assert_eq!(record.page_numbers(), "12, 15");
        assert_eq!(record.improvement_type(), "Correction");
        assert_eq!(record.date_updated(), "");
    }

    #[test]
    fn invalid_date_names_field() {
        let raw = RawRecord {
            improvement_description: "Typo".into(),
            date_updated: "sometime last spring".into(),
            ..Default::default()
        };
        let err = normalize(&raw, &context(), at()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidDate {
                field: "Date_Updated",
                value: "sometime last spring".into()
            }
        );
    }

    #[test]
    fn empty_description_is_rejected() {
        let raw = RawRecord {
            resource: "Student Edition".into(),
            improvement_description: " \n ".into(),
            ..Default::default()
        };
        assert_eq!(
            normalize(&raw, &context(), at()),
            Err(ValidationError::MissingField {
                field: "Improvement_Description"
            })
        );
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let raw = RawRecord {
            improvement_description: "Fixed graph label".into(),
            component: Some("Miscellaneous notes".into()),
            ..Default::default()
        };
        let first = normalize(&raw, &context(), at()).unwrap();
        let second = normalize(&raw, &context(), at()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.location(), "Miscellaneous notes");
        assert_eq!(first.resource(), "");
    }
}

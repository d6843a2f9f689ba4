//! Splitting of the packed "Component" cell
//!
//! Some pages use a three-column table where the first cell packs resource,
//! location and pages together, e.g. `Teacher Guide, Lesson 3 Section A, pp. 12-15`.
//! The split is heuristic; [`SplitConfidence`] tells the caller how much of
//! the expected shape was found so weak splits can be logged.

use std::sync::LazyLock;

use regex::Regex;

use super::pages::normalize_page_numbers;
use crate::utils::collapse_whitespace;

static PAGE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[,;(]\s*|\s+)\(?(?:pages?|pgs?|pp|p)\.?\s*(\d+(?:\s*[-–—]\s*\d+)?(?:\s*(?:,|&|\band\b)\s*\d+(?:\s*[-–—]\s*\d+)?)*)\)?",
    )
    .expect("BUG: hardcoded page clause regex is invalid")
});

static RESOURCE_KIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)\b(?:
            teacher(?:'s|s)?\s+(?:course\s+)?(?:guide|edition)
            | student\s+(?:edition|guide|workbook|book|journal|task\s+statements)
            | answer\s+key
            | glossary
            | assessments?
            | practice\s+(?:book|problems)
            | course\s+guide
            | lesson\s+guide
            | workbook
        )\b",
    )
    .expect("BUG: hardcoded resource kind regex is invalid")
});

/// How much of the expected shape a split recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitConfidence {
    /// A known resource kind led the text
    Recognized,
    /// Some parts were found but the text did not follow the usual shape
    Partial,
    /// Nothing recognisable; everything went to Location
    Unrecognized,
}

/// Result of splitting a Component cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSplit {
    pub resource: String,
    pub location: String,
    pub page_numbers: String,
    pub confidence: SplitConfidence,
}

/// Split packed Component text into Resource, Location and Page_Numbers.
///
/// Never fails: text with no recognisable parts lands in Location unchanged
/// (whitespace-collapsed) with the other two fields empty.
#[must_use]
pub fn split_component(text: &str) -> ComponentSplit {
    let text = collapse_whitespace(text);

    let (rest, page_numbers) = match PAGE_CLAUSE.captures_iter(&text).last() {
        Some(caps) => {
            let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
            let rest = format!("{} {}", &text[..start], &text[end..]);
            (tidy(&rest), normalize_page_numbers(&caps[1]))
        }
        None => (text.clone(), String::new()),
    };

    let (head, tail) = match rest.split_once(',') {
        Some((head, tail)) => (tidy(head), Some(tidy(tail))),
        None => (rest.clone(), None),
    };

    let Some((kind_start, kind_end)) = leading_resource_span(&head) else {
        if page_numbers.is_empty() {
            return ComponentSplit {
                resource: String::new(),
                location: text,
                page_numbers,
                confidence: SplitConfidence::Unrecognized,
            };
        }
        return ComponentSplit {
            resource: String::new(),
            location: rest,
            page_numbers,
            confidence: SplitConfidence::Partial,
        };
    };

    // A kind mentioned mid-segment ("Lesson 3 Assessment") is not a leading resource
    let confidence = if kind_start == 0 {
        SplitConfidence::Recognized
    } else {
        SplitConfidence::Partial
    };

    match tail {
        Some(location) => ComponentSplit {
            resource: head,
            location,
            page_numbers,
            confidence,
        },
        None => ComponentSplit {
            resource: tidy(&head[..kind_end]),
            location: tidy(&head[kind_end..]),
            page_numbers,
            confidence,
        },
    }
}

/// Byte span from the first resource-kind mention through any kinds that
/// directly follow it ("Teacher Edition Glossary")
fn leading_resource_span(text: &str) -> Option<(usize, usize)> {
    let mut matches = RESOURCE_KIND.find_iter(text);
    let first = matches.next()?;
    let mut end = first.end();
    for m in matches {
        if !text[end..m.start()].trim().is_empty() {
            break;
        }
        end = m.end();
    }
    Some((first.start(), end))
}

fn tidy(s: &str) -> String {
    collapse_whitespace(s.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_shape() {
        let split = split_component("Teacher Guide, Lesson 3 Section A, pp. 12-15");
        assert_eq!(split.resource, "Teacher Guide");
        assert_eq!(split.location, "Lesson 3 Section A");
        assert_eq!(split.page_numbers, "12-15");
        assert_eq!(split.confidence, SplitConfidence::Recognized);
    }

    #[test]
    fn unrecognized_goes_to_location() {
        let split = split_component("Miscellaneous notes");
        assert_eq!(split.resource, "");
        assert_eq!(split.location, "Miscellaneous notes");
        assert_eq!(split.page_numbers, "");
        assert_eq!(split.confidence, SplitConfidence::Unrecognized);
    }

    #[test]
    fn adjacent_kinds_stay_together() {
        let split = split_component("Teacher Edition Glossary, pgs. 346-347");
        assert_eq!(split.resource, "Teacher Edition Glossary");
        assert_eq!(split.location, "");
        assert_eq!(split.page_numbers, "346-347");
    }

    #[test]
    fn resource_without_comma() {
        let split = split_component("Student Edition Unit 2");
        assert_eq!(split.resource, "Student Edition");
        assert_eq!(split.location, "Unit 2");
        assert_eq!(split.confidence, SplitConfidence::Recognized);
    }

    #[test]
    fn kind_inside_leading_segment_is_partial() {
        let split = split_component("Lesson 3 Assessment, Problem 2");
        assert_eq!(split.resource, "Lesson 3 Assessment");
        assert_eq!(split.location, "Problem 2");
        assert_eq!(split.confidence, SplitConfidence::Partial);
    }

    #[test]
    fn pages_without_resource_is_partial() {
        let split = split_component("Lesson 4 Activity 2 (pp. 7, 9)");
        assert_eq!(split.resource, "");
        assert_eq!(split.page_numbers, "7, 9");
        assert_eq!(split.location, "Lesson 4 Activity 2");
        assert_eq!(split.confidence, SplitConfidence::Partial);
    }
}

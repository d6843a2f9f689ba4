//! Source-date parsing into ISO `YYYY-MM-DD`

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Numeric and month-name date shapes, anchored or embedded in prose
static DATE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?P<ymd>\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2})
        | (?P<mdy>\b\d{1,2}[-/]\d{1,2}[-/]\d{2}(?:\d{2})?\b)
        | (?P<named>\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b)
        ",
    )
    .expect("BUG: hardcoded date regex is invalid")
});

static NUMERIC_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)[-/.](\d+)[-/.](\d+)$").expect("BUG: hardcoded date parts regex is invalid")
});

static NAMED_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$")
        .expect("BUG: hardcoded named date regex is invalid")
});

/// Text that holds none of the supported date forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnparsableDate;

/// Parse a source-reported date.
///
/// Returns `Ok(None)` for empty text, `Ok(Some(date))` when a supported form
/// is found (anywhere in the text), and [`UnparsableDate`] otherwise.
pub fn parse_source_date(text: &str) -> Result<Option<NaiveDate>, UnparsableDate> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    for caps in DATE_IN_TEXT.captures_iter(text) {
        let parsed = if let Some(m) = caps.name("ymd") {
            parse_numeric(m.as_str(), NumericOrder::YearFirst)
        } else if let Some(m) = caps.name("mdy") {
            parse_numeric(m.as_str(), NumericOrder::MonthFirst)
        } else if let Some(m) = caps.name("named") {
            parse_named(m.as_str())
        } else {
            None
        };
        if parsed.is_some() {
            return Ok(parsed);
        }
    }

    Err(UnparsableDate)
}

/// Normalize to `YYYY-MM-DD`, keeping empty input empty
pub fn normalize_date(text: &str) -> Result<String, UnparsableDate> {
    Ok(parse_source_date(text)?
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default())
}

#[derive(Clone, Copy)]
enum NumericOrder {
    YearFirst,
    MonthFirst,
}

fn parse_numeric(text: &str, order: NumericOrder) -> Option<NaiveDate> {
    let caps = NUMERIC_PARTS.captures(text)?;
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let c = &caps[3];

    match order {
        NumericOrder::YearFirst => NaiveDate::from_ymd_opt(i32::try_from(a).ok()?, b, c.parse().ok()?),
        NumericOrder::MonthFirst => {
            let year: i32 = match c.len() {
                4 => c.parse().ok()?,
                // Two-digit years are this century
                2 => 2000 + c.parse::<i32>().ok()?,
                _ => return None,
            };
            NaiveDate::from_ymd_opt(year, a, b)
        }
    }
}

fn parse_named(text: &str) -> Option<NaiveDate> {
    let caps = NAMED_PARTS.captures(text.trim())?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let name = name.to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&name) || (name == "sept" && *m == "september"))
        .and_then(|i| u32::try_from(i + 1).ok())
}

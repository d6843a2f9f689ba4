//! Page reference normalization

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::collapse_whitespace;

static PAGE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:pages?|pgs?|pp|p)\.?\s*(?P<first>\d)")
        .expect("BUG: hardcoded page prefix regex is invalid")
});

/// Whole-text page list: single, range, or separated list of either
static PAGE_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\d+(?:\s*[-–—]\s*\d+)?(?:\s*(?:,|;|&|\band\b)\s*\d+(?:\s*[-–—]\s*\d+)?)*$",
    )
    .expect("BUG: hardcoded page list regex is invalid")
});

static PAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:\s*[-–—]\s*(\d+))?").expect("BUG: hardcoded page token regex is invalid")
});

/// Normalize a page reference.
///
/// `"pp. 12,15"` becomes `"12, 15"`, `"12 - 15"` becomes `"12-15"`. Text that is
/// not a page list is returned whitespace-collapsed with any prefix removed.
#[must_use]
pub fn normalize_page_numbers(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let stripped = PAGE_PREFIX.replace(&collapsed, "${first}");
    let stripped = stripped.trim().trim_end_matches(['.', ',', ';']).trim();

    if !PAGE_LIST.is_match(stripped) {
        return stripped.to_string();
    }

    PAGE_TOKEN
        .captures_iter(stripped)
        .map(|caps| match caps.get(2) {
            Some(end) => format!("{}-{}", &caps[1], end.as_str()),
            None => caps[1].to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

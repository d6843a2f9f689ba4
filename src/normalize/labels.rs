//! Course label derivation for pages without an explicit unit label

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::collapse_whitespace;

struct LabelPattern {
    title: Regex,
    url: Regex,
    label: &'static str,
}

// Order matters: Pre-Algebra must be tried before Algebra N.
static PATTERNS: LazyLock<Vec<LabelPattern>> = LazyLock::new(|| {
    let pattern = |title: &str, url: &str, label: &'static str| LabelPattern {
        title: Regex::new(title).expect("BUG: hardcoded label regex is invalid"),
        url: Regex::new(url).expect("BUG: hardcoded label regex is invalid"),
        label,
    };
    vec![
        pattern(r"(?i)\bkindergarten\b", r"(?i)kindergarten", "Kindergarten"),
        pattern(r"(?i)\bpre-?algebra\b", r"(?i)pre-algebra", "Pre-Algebra"),
        pattern(r"(?i)\bgrade\s*(\d+)", r"(?i)grade-(\d+)", "Grade"),
        pattern(r"(?i)\balgebra\s*(\d+)", r"(?i)algebra-(\d+)", "Algebra"),
        pattern(r"(?i)\bgeometry\b", r"(?i)geometry", "Geometry"),
        pattern(r"(?i)\bcalculus\b", r"(?i)calculus", "Calculus"),
    ]
});

fn label_from(re: &Regex, label: &str, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    Some(match caps.get(1) {
        Some(n) => format!("{label} {}", n.as_str()),
        None => label.to_string(),
    })
}

/// Derive a course label such as `Grade 3` or `Algebra 1`.
///
/// The title is tried first, then the URL. A title that mentions a course
/// word without a recognised form contributes its first `|` segment. Returns
/// `None` when nothing matches; the caller falls back to the page path.
#[must_use]
pub fn derive_page_label(title: Option<&str>, url: &str) -> Option<String> {
    let title = title.map(collapse_whitespace).unwrap_or_default();

    if !title.is_empty()
        && let Some(label) = PATTERNS
            .iter()
            .find_map(|p| label_from(&p.title, p.label, &title))
    {
        return Some(label);
    }

    if let Some(label) = PATTERNS.iter().find_map(|p| label_from(&p.url, p.label, url)) {
        return Some(label);
    }

    let lower = title.to_lowercase();
    if ["kindergarten", "grade", "algebra", "geometry"]
        .iter()
        .any(|w| lower.contains(w))
    {
        let first = title.split('|').next().unwrap_or_default().trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }

    None
}

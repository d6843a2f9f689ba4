//! Text helpers shared by the extractor, normalizer and log statements

/// Collapse every run of whitespace (including non-breaking spaces) into a
/// single ASCII space and trim both ends.
///
/// ```
/// # use errata_locator::utils::string_utils::collapse_whitespace;
/// assert_eq!(collapse_whitespace("  Lesson\n\t3\u{a0} Section A "), "Lesson 3 Section A");
/// assert_eq!(collapse_whitespace("\n \n"), "");
/// ```
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(|c: char| c.is_whitespace()).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Truncate to at most `max_chars` characters without splitting a UTF-8
/// sequence. Used for log previews of long descriptions.
///
/// ```
/// # use errata_locator::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("Größe", 3), "Grö");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
#[must_use]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

//! JavaScript evaluated in the page
//!
//! Scripts that take a CSS selector are built with [`with_selector`], which
//! embeds the selector as a JSON string literal so quotes cannot break out.

/// Document readiness snapshot
pub const READY_STATE_SCRIPT: &str = r#"
    (() => ({
        readyState: document.readyState,
        bodyExists: document.body !== null
    }))()
"#;

/// Click every collapsed toggle and open every closed `<details>`.
/// Evaluates to the number of elements acted on.
const EXPAND_COLLAPSED_TEMPLATE: &str = r#"
    (() => {
        const selector = __SELECTOR__;
        let acted = 0;
        document.querySelectorAll(selector).forEach(el => {
            if (el.getAttribute('aria-expanded') === 'false') {
                try { el.click(); acted++; } catch (e) {}
            }
        });
        document.querySelectorAll('details:not([open])').forEach(d => {
            d.open = true;
            acted++;
        });
        return acted;
    })()
"#;

/// Number of toggles still collapsed
const COUNT_COLLAPSED_TEMPLATE: &str = r#"
    (() => {
        const selector = __SELECTOR__;
        let collapsed = 0;
        document.querySelectorAll(selector).forEach(el => {
            if (el.getAttribute('aria-expanded') === 'false') collapsed++;
        });
        return collapsed + document.querySelectorAll('details:not([open])').length;
    })()
"#;

/// Whether any element matches
const HAS_ELEMENT_TEMPLATE: &str = r#"
    (() => document.querySelector(__SELECTOR__) !== null)()
"#;

fn with_selector(template: &str, selector: &str) -> String {
    let literal = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    template.replace("__SELECTOR__", &literal)
}

#[must_use]
pub fn expand_collapsed_script(toggle_selector: &str) -> String {
    with_selector(EXPAND_COLLAPSED_TEMPLATE, toggle_selector)
}

#[must_use]
pub fn count_collapsed_script(toggle_selector: &str) -> String {
    with_selector(COUNT_COLLAPSED_TEMPLATE, toggle_selector)
}

#[must_use]
pub fn has_element_script(selector: &str) -> String {
    with_selector(HAS_ELEMENT_TEMPLATE, selector)
}

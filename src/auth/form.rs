//! Login-form inspection on fetched HTML
//!
//! All functions parse and drop the document before returning, so callers
//! can use them between awaits.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Hidden input names that carry an anti-forgery token
pub const TOKEN_FIELDS: [&str; 4] = [
    "csrf_token",
    "authenticity_token",
    "_token",
    "csrfmiddlewaretoken",
];

static FORM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("BUG: hardcoded CSS selector 'form' is invalid"));

static TOKEN_INPUTS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    TOKEN_FIELDS
        .iter()
        .map(|name| {
            let css = format!("input[name='{name}']");
            (
                *name,
                Selector::parse(&css).expect("BUG: hardcoded token selector is invalid"),
            )
        })
        .collect()
});

static CSRF_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[name='csrf-token']").expect("BUG: hardcoded CSS selector for csrf meta is invalid")
});

static CSRF_PARAM_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[name='csrf-param']").expect("BUG: hardcoded CSS selector for csrf param is invalid")
});

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid"));

/// What the login page offers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPage {
    /// A password input matching the configured selector exists
    pub has_password_input: bool,
    /// `action` of the form holding the password input
    pub action: Option<String>,
    /// Anti-forgery token as (field name, value)
    pub token: Option<(String, String)>,
}

/// Inspect a login page
#[must_use]
pub fn inspect_login_page(html: &str, password_input: &Selector) -> LoginPage {
    let document = Html::parse_document(html);

    let login_form = document
        .select(&FORM)
        .find(|form| form.select(password_input).next().is_some());

    LoginPage {
        has_password_input: document.select(password_input).next().is_some(),
        action: login_form
            .and_then(|form| form.value().attr("action"))
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        token: find_token(&document),
    }
}

fn find_token(document: &Html) -> Option<(String, String)> {
    for (name, selector) in TOKEN_INPUTS.iter() {
        if let Some(value) = document
            .select(selector)
            .find_map(|input| input.value().attr("value"))
            .filter(|v| !v.is_empty())
        {
            return Some(((*name).to_string(), value.to_string()));
        }
    }

    let value = document
        .select(&CSRF_META)
        .find_map(|meta| meta.value().attr("content"))
        .filter(|v| !v.is_empty())?;
    let name = document
        .select(&CSRF_PARAM_META)
        .find_map(|meta| meta.value().attr("content"))
        .filter(|v| !v.is_empty())
        .unwrap_or("authenticity_token");
    Some((name.to_string(), value.to_string()))
}

/// Whether the document contains a password input
#[must_use]
pub fn has_password_input(html: &str, password_input: &Selector) -> bool {
    Html::parse_document(html)
        .select(password_input)
        .next()
        .is_some()
}

/// Document title, whitespace-collapsed
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    Html::parse_document(html)
        .select(&TITLE)
        .next()
        .map(|t| crate::utils::collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

//! URL helpers for site-relative page paths and login detection

use url::Url;

/// Join a configured page path onto the site base URL.
///
/// The path is appended to the base rather than resolved against it, so a
/// base of `https://host/app` and a path of `/errata` yield
/// `https://host/app/errata`. Absolute `http(s)` paths are used unchanged.
pub fn join_site_url(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path);
    }

    let base = base_url.trim().trim_end_matches('/');
    if path.is_empty() {
        return Url::parse(base);
    }
    if path.starts_with('/') {
        Url::parse(&format!("{base}{path}"))
    } else {
        Url::parse(&format!("{base}/{path}"))
    }
}

/// Whether `url` points at (or below) the path of `login_url`.
///
/// Used by both strategies to tell a redirect back to the login page apart
/// from a successful navigation.
#[must_use]
pub fn path_contains(url: &str, login_url: &Url) -> bool {
    let login_path = login_url.path().trim_end_matches('/');
    if login_path.is_empty() {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => parsed.path().starts_with(login_path),
        Err(_) => url.contains(login_path),
    }
}

/// Check if a URL is an absolute http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

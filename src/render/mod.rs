//! Page rendering
//!
//! A [`Renderer`] fetches one configured page with an authenticated session
//! and returns its final HTML. The browser renderer also opens collapsed
//! accordion sections first; the HTTP renderer sees only the served markup.

pub mod browser;
pub mod http;
pub mod js_scripts;
pub mod timeout;

use std::future::Future;

use crate::config::PageSpec;
use crate::errors::FetchError;

pub use browser::BrowserRenderer;
pub use http::HttpRenderer;
pub use timeout::with_page_timeout;

/// Rendered page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// URL after redirects
    pub url: String,
    pub title: Option<String>,
    pub html: String,
}

/// Fetches pages with a session produced by the matching authenticator
pub trait Renderer {
    type Session;

    fn render(
        &self,
        session: &Self::Session,
        page: &PageSpec,
    ) -> impl Future<Output = Result<RenderedPage, FetchError>>;
}

//! Browser renderer: navigate, wait, open every accordion, capture
//!
//! Accordion content is often injected only when a section is opened, so
//! the page is captured once no toggle reports `aria-expanded="false"`. If
//! some sections stay collapsed past the wait, the count is logged; the
//! page is still captured.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::js_scripts::{count_collapsed_script, expand_collapsed_script};
use super::{RenderedPage, Renderer};
use crate::auth::BrowserSession;
use crate::browser::page_helpers::{evaluate_value, get_page_url_with_fallback, wait_for_page_load};
use crate::config::{ErrataConfig, PageSpec};
use crate::errors::FetchError;
use crate::utils::{POLL_INTERVAL_MS, path_contains};

/// Renders pages in the session's tab
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    request_timeout: Duration,
    accordion_timeout: Duration,
}

impl BrowserRenderer {
    #[must_use]
    pub fn new(config: &ErrataConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            accordion_timeout: config.accordion_timeout(),
        }
    }

    /// Open collapsed sections until none remain or the wait runs out.
    /// Returns how many stayed collapsed.
    async fn expand_sections(&self, session: &BrowserSession, page: &PageSpec) -> Result<u64, FetchError> {
        let toggle = page.selectors().accordion_toggle();
        let expand = expand_collapsed_script(toggle);
        let count = count_collapsed_script(toggle);
        let browser_err = |detail: String| FetchError::Browser {
            url: page.url().to_string(),
            detail,
        };

        let deadline = Instant::now() + self.accordion_timeout;
        let mut rounds = 0u32;
        loop {
            let acted = evaluate_value::<f64>(session.page(), &expand)
                .await
                .map_err(browser_err)? as u64;
            if acted > 0 {
                debug!(target: "errata::render", page = %page.id(), acted, "Expanded sections");
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;

            // JS numbers arrive as JSON numbers that may carry a fraction
            let remaining = evaluate_value::<f64>(session.page(), &count)
                .await
                .map_err(browser_err)? as u64;
            rounds += 1;
            if remaining == 0 {
                debug!(target: "errata::render", page = %page.id(), rounds, "All sections expanded");
                return Ok(0);
            }
            if Instant::now() >= deadline {
                return Ok(remaining);
            }
        }
    }
}

impl Renderer for BrowserRenderer {
    type Session = BrowserSession;

    async fn render(&self, session: &BrowserSession, page: &PageSpec) -> Result<RenderedPage, FetchError> {
        let url = page.url().as_str();
        let tab = session.page();

        match tokio::time::timeout(self.request_timeout, tab.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(FetchError::Browser {
                    url: url.to_string(),
                    detail: format!("navigation failed: {e}"),
                });
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    operation: "navigation".to_string(),
                    timeout: self.request_timeout,
                });
            }
        }
        wait_for_page_load(tab, self.request_timeout).await;

        let final_url = get_page_url_with_fallback(tab).await;
        if !path_contains(url, session.login_url())
            && (path_contains(&final_url, session.login_url()) || session.shows_login_form().await)
        {
            return Err(FetchError::SessionExpired {
                url: url.to_string(),
            });
        }

        let still_collapsed = self.expand_sections(session, page).await?;
        if still_collapsed > 0 {
            warn!(
                target: "errata::render",
                page = %page.id(),
                still_collapsed,
                "Some sections did not expand; their content may be missing"
            );
        }

        let html = tab.content().await.map_err(|e| FetchError::Browser {
            url: url.to_string(),
            detail: format!("failed to read content: {e}"),
        })?;
        let title = tab
            .get_title()
            .await
            .ok()
            .flatten()
            .map(|t| crate::utils::collapse_whitespace(&t))
            .filter(|t| !t.is_empty());

        Ok(RenderedPage {
            url: final_url,
            title,
            html,
        })
    }
}

//! HTTP renderer: a cookie-authenticated GET, no script execution

use std::time::Duration;

use tracing::debug;

use super::{RenderedPage, Renderer};
use crate::auth::HttpSession;
use crate::auth::form::page_title;
use crate::config::{ErrataConfig, PageSpec};
use crate::errors::FetchError;

/// Fetches pages with an [`HttpSession`]
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    request_timeout: Duration,
}

impl HttpRenderer {
    #[must_use]
    pub fn new(config: &ErrataConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
        }
    }

    fn send_error(&self, err: reqwest::Error, url: &str) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                operation: "HTTP GET".to_string(),
                timeout: self.request_timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                detail: err.to_string(),
            }
        }
    }
}

impl Renderer for HttpRenderer {
    type Session = HttpSession;

    async fn render(&self, session: &HttpSession, page: &PageSpec) -> Result<RenderedPage, FetchError> {
        let url = page.url().as_str();
        debug!(target: "errata::render", page = %page.id(), %url, "GET");

        let response = session
            .client()
            .get(page.url().clone())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e, url))?;

        let status = response.status();
        if matches!(status.as_u16(), 401 | 403) {
            return Err(FetchError::SessionExpired {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        if session.redirected_to_login(page.url(), &final_url) {
            return Err(FetchError::SessionExpired {
                url: url.to_string(),
            });
        }

        let html = response.text().await.map_err(|e| self.send_error(e, url))?;
        if session.shows_login_form(&html) {
            return Err(FetchError::SessionExpired {
                url: url.to_string(),
            });
        }

        Ok(RenderedPage {
            url: final_url,
            title: page_title(&html),
            html,
        })
    }
}

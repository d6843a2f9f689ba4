//! Browser login: type the credentials into the rendered form
//!
//! Needed when the login form is built by JavaScript and a plain POST is
//! not accepted. The resulting session is the logged-in tab itself.

use std::time::{Duration, Instant};

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use super::{Authenticator, Session};
use crate::browser::page_helpers::{
    evaluate_value, get_page_url_with_fallback, wait_for_page_load, wait_for_selector,
};
use crate::config::ErrataConfig;
use crate::credentials::Credentials;
use crate::errors::{AuthError, ConfigError};
use crate::render::js_scripts::has_element_script;
use crate::utils::{POLL_INTERVAL_MS, path_contains};

/// Browser login strategy, borrowing a launched browser
pub struct BrowserAuthenticator<'a> {
    browser: &'a Browser,
    login_url: Url,
    form_selector: String,
    username_input: String,
    password_input: String,
    login_timeout: Duration,
    request_timeout: Duration,
}

impl<'a> BrowserAuthenticator<'a> {
    pub fn new(browser: &'a Browser, config: &ErrataConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            browser,
            login_url: config.login_url()?,
            form_selector: config.login_form_selector().to_string(),
            username_input: config.username_input().to_string(),
            password_input: config.password_input().to_string(),
            login_timeout: config.login_timeout(),
            request_timeout: config.request_timeout(),
        })
    }

    async fn step<T, E: std::fmt::Display>(
        &self,
        step: &str,
        timeout: Duration,
        fut: impl std::future::Future<Output = Result<T, E>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AuthError::Browser(format!("{step}: {e}"))),
            Err(_) => Err(AuthError::Timeout {
                step: step.to_string(),
                timeout,
            }),
        }
    }

    async fn log_in(&self, page: &Page, credentials: &Credentials) -> Result<(), AuthError> {
        match tokio::time::timeout(self.request_timeout, page.goto(self.login_url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(AuthError::Unreachable {
                    url: self.login_url.to_string(),
                    detail: e.to_string(),
                });
            }
            Err(_) => {
                return Err(AuthError::Timeout {
                    step: "open login page".to_string(),
                    timeout: self.request_timeout,
                });
            }
        }
        wait_for_page_load(page, self.request_timeout).await;

        if !wait_for_selector(page, &self.form_selector, self.login_timeout).await {
            return Err(AuthError::LoginFormMissing {
                url: get_page_url_with_fallback(page).await,
                element: self.form_selector.clone(),
            });
        }

        let username = page
            .find_element(self.username_input.as_str())
            .await
            .map_err(|_| AuthError::LoginFormMissing {
                url: self.login_url.to_string(),
                element: self.username_input.clone(),
            })?;
        self.step("focus username", self.request_timeout, username.click()).await?;
        self.step(
            "type username",
            self.request_timeout,
            username.type_str(credentials.username()),
        )
        .await?;

        let password = page
            .find_element(self.password_input.as_str())
            .await
            .map_err(|_| AuthError::LoginFormMissing {
                url: self.login_url.to_string(),
                element: self.password_input.clone(),
            })?;
        self.step("focus password", self.request_timeout, password.click()).await?;
        self.step(
            "type password",
            self.request_timeout,
            password.type_str(credentials.password()),
        )
        .await?;
        self.step("submit login", self.request_timeout, password.press_key("Enter"))
            .await?;
        debug!(target: "errata::auth", "Submitted login form");

        // SPA logins may not trigger a navigation event, so poll the URL too
        let deadline = Instant::now() + self.login_timeout;
        loop {
            let current = get_page_url_with_fallback(page).await;
            if current != "about:blank" && !path_contains(&current, &self.login_url) {
                wait_for_page_load(page, self.request_timeout).await;
                info!(target: "errata::auth", landed = %current, "Browser login succeeded");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AuthError::InvalidCredentials {
                    url: current,
                    detail: "still on the login page after submitting".to_string(),
                });
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }
}

impl Authenticator for BrowserAuthenticator<'_> {
    type Session = BrowserSession;

    async fn authenticate(&self, credentials: &Credentials) -> Result<BrowserSession, AuthError> {
        info!(
            target: "errata::auth",
            url = %self.login_url,
            user = %credentials.username(),
            "Logging in with browser"
        );

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AuthError::Browser(format!("failed to open tab: {e}")))?;

        match self.log_in(&page, credentials).await {
            Ok(()) => Ok(BrowserSession {
                page,
                login_url: self.login_url.clone(),
                password_input: self.password_input.clone(),
                acquired_at: Utc::now(),
            }),
            Err(e) => {
                if let Err(close_err) = page.close().await {
                    warn!(target: "errata::auth", "Failed to close login tab: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

/// Logged-in browser tab
pub struct BrowserSession {
    page: Page,
    login_url: Url,
    password_input: String,
    acquired_at: DateTime<Utc>,
}

impl BrowserSession {
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Whether the tab is showing the login form
    pub async fn shows_login_form(&self) -> bool {
        evaluate_value::<bool>(&self.page, &has_element_script(&self.password_input))
            .await
            .unwrap_or(false)
    }
}

impl Session for BrowserSession {
    fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    async fn verify(&self) -> bool {
        let current = get_page_url_with_fallback(&self.page).await;
        !path_contains(&current, &self.login_url) && !self.shows_login_form().await
    }

    async fn close(self) {
        if let Err(e) = self.page.close().await {
            warn!(target: "errata::auth", "Failed to close session tab: {}", e);
        }
    }
}

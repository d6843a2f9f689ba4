//! Plain-HTTP login with a cookie jar
//!
//! GET the login page, pick up the anti-forgery token, POST the form and
//! keep the resulting cookies in the client for every later page fetch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use scraper::Selector;
use tracing::{debug, info, warn};
use url::Url;

use super::form::{has_password_input, inspect_login_page};
use super::{Authenticator, Session};
use crate::config::ErrataConfig;
use crate::credentials::Credentials;
use crate::errors::{AuthError, ConfigError};
use crate::utils::path_contains;

/// Phrases that only appear on pages behind the login
const LOGGED_IN_MARKERS: [&str; 4] = ["logout", "log out", "sign out", "dashboard"];

/// HTTP login strategy
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    base_url: Url,
    login_url: Url,
    username_field: String,
    password_field: String,
    success_indicator: Option<String>,
    password_input: Selector,
    password_input_css: String,
    user_agent: String,
    request_timeout: Duration,
    accept_invalid_certs: bool,
}

impl HttpAuthenticator {
    pub fn new(config: &ErrataConfig) -> Result<Self, ConfigError> {
        let password_input_css = config.password_input().to_string();
        let password_input =
            Selector::parse(&password_input_css).map_err(|e| ConfigError::InvalidSelector {
                key: "login.password_input".to_string(),
                selector: password_input_css.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: config.base_url()?,
            login_url: config.login_url()?,
            username_field: config.username_field().to_string(),
            password_field: config.password_field().to_string(),
            success_indicator: config.success_indicator().map(str::to_string),
            password_input,
            password_input_css,
            user_agent: config.user_agent().to_string(),
            request_timeout: config.request_timeout(),
            accept_invalid_certs: config.accept_invalid_certs(),
        })
    }

    /// Fresh client with an empty cookie jar
    fn client(&self) -> Result<Client, AuthError> {
        if self.accept_invalid_certs {
            warn!(target: "errata::auth", "TLS certificate verification is disabled");
        }
        Client::builder()
            .cookie_store(true)
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .connect_timeout(self.request_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| AuthError::Unreachable {
                url: self.login_url.to_string(),
                detail: format!("failed to build HTTP client: {e}"),
            })
    }

    fn send_error(&self, err: reqwest::Error, step: &str) -> AuthError {
        if err.is_timeout() {
            AuthError::Timeout {
                step: step.to_string(),
                timeout: self.request_timeout,
            }
        } else {
            AuthError::Unreachable {
                url: self.login_url.to_string(),
                detail: format!("{step}: {err}"),
            }
        }
    }

    fn check_login_response(
        &self,
        status: StatusCode,
        final_url: &str,
        body: &str,
    ) -> Result<(), AuthError> {
        let rejected = |detail: String| AuthError::InvalidCredentials {
            url: final_url.to_string(),
            detail,
        };

        if matches!(status.as_u16(), 401 | 403 | 422) {
            return Err(rejected(format!("login returned HTTP {status}")));
        }
        if !status.is_success() {
            return Err(AuthError::Unreachable {
                url: final_url.to_string(),
                detail: format!("login returned HTTP {status}"),
            });
        }

        let lower = body.to_lowercase();
        if let Some(indicator) = &self.success_indicator
            && lower.contains(&indicator.to_lowercase())
        {
            return Ok(());
        }
        if has_password_input(body, &self.password_input) {
            return Err(rejected("login form was shown again".to_string()));
        }
        if LOGGED_IN_MARKERS.iter().any(|m| lower.contains(m)) {
            return Ok(());
        }
        if !path_contains(final_url, &self.login_url) {
            return Ok(());
        }
        Err(rejected("still on the login page after submitting".to_string()))
    }
}

impl Authenticator for HttpAuthenticator {
    type Session = HttpSession;

    async fn authenticate(&self, credentials: &Credentials) -> Result<HttpSession, AuthError> {
        let client = self.client()?;
        info!(
            target: "errata::auth",
            url = %self.login_url,
            user = %credentials.username(),
            "Logging in over HTTP"
        );

        let response = client
            .get(self.login_url.clone())
            .send()
            .await
            .map_err(|e| self.send_error(e, "load login page"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Unreachable {
                url: self.login_url.to_string(),
                detail: format!("login page returned HTTP {status}"),
            });
        }
        let page_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| self.send_error(e, "read login page"))?;

        let login_page = inspect_login_page(&body, &self.password_input);
        if !login_page.has_password_input {
            return Err(AuthError::LoginFormMissing {
                url: page_url.to_string(),
                element: self.password_input_css.clone(),
            });
        }

        let mut form = vec![
            (self.username_field.clone(), credentials.username().to_string()),
            (self.password_field.clone(), credentials.password().to_string()),
        ];
        if self.username_field != "email" {
            form.push(("email".to_string(), credentials.username().to_string()));
        }
        match login_page.token {
            Some((name, value)) => {
                debug!(target: "errata::auth", field = %name, "Found anti-forgery token");
                form.push((name, value));
            }
            None => debug!(target: "errata::auth", "No anti-forgery token on login page"),
        }

        let action = login_page
            .action
            .as_deref()
            .and_then(|a| page_url.join(a).ok())
            .unwrap_or_else(|| page_url.clone());

        let response = client
            .post(action)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.send_error(e, "submit login"))?;
        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| self.send_error(e, "read login response"))?;

        self.check_login_response(status, &final_url, &body)?;
        info!(target: "errata::auth", landed = %final_url, "Login succeeded");

        Ok(HttpSession {
            client,
            base_url: self.base_url.clone(),
            login_url: self.login_url.clone(),
            password_input: self.password_input.clone(),
            acquired_at: Utc::now(),
        })
    }
}

/// Cookie-jar session
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    base_url: Url,
    login_url: Url,
    password_input: Selector,
    acquired_at: DateTime<Utc>,
}

impl HttpSession {
    /// Client carrying the session cookies
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Whether a response for `requested` ended up on the login page
    #[must_use]
    pub fn redirected_to_login(&self, requested: &Url, final_url: &str) -> bool {
        !path_contains(requested.as_str(), &self.login_url) && path_contains(final_url, &self.login_url)
    }

    /// Whether `body` is a login form rather than content
    #[must_use]
    pub fn shows_login_form(&self, body: &str) -> bool {
        has_password_input(body, &self.password_input)
    }
}

impl Session for HttpSession {
    fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    async fn verify(&self) -> bool {
        let response = match self.client.get(self.base_url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(target: "errata::auth", error = %e, "Session probe failed");
                return false;
            }
        };
        if !response.status().is_success() {
            return false;
        }
        let final_url = response.url().to_string();
        if self.redirected_to_login(&self.base_url, &final_url) {
            return false;
        }
        match response.text().await {
            Ok(body) => !self.shows_login_form(&body),
            Err(_) => false,
        }
    }

    async fn close(self) {
        // Dropping the client releases the cookie jar and pooled connections
        debug!(target: "errata::auth", "Closing HTTP session");
    }
}

//! Wiring of the two fetch strategies
//!
//! Both strategies run the same [`Pipeline`]; they differ only in the
//! authenticator/renderer pair. The browser strategy owns a launched browser
//! for the duration of the run and always shuts it down afterwards.

use std::fmt;

use chromiumoxide::browser::Browser;
use tracing::info;

use super::{AuthProbe, Pipeline, RunReport};
use crate::auth::{BrowserAuthenticator, HttpAuthenticator};
use crate::browser::{BrowserWrapper, LaunchOptions};
use crate::config::ErrataConfig;
use crate::credentials::Credentials;
use crate::dataset::MergeMode;
use crate::errors::ErrataResult;
use crate::render::{BrowserRenderer, HttpRenderer};

/// How pages are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Headless Chromium; sees JavaScript-rendered content and opens accordions
    #[default]
    Browser,
    /// Plain HTTP with a cookie jar; only sees the served markup
    Http,
}

impl FetchStrategy {
    #[must_use]
    pub fn from_use_requests(use_requests: bool) -> Self {
        if use_requests {
            FetchStrategy::Http
        } else {
            FetchStrategy::Browser
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchStrategy::Browser => "browser",
            FetchStrategy::Http => "http",
        })
    }
}

/// Run the full pipeline with the chosen strategy
pub async fn run_with_strategy(
    config: &ErrataConfig,
    credentials: &Credentials,
    strategy: FetchStrategy,
    mode: MergeMode,
) -> ErrataResult<RunReport> {
    let pipeline = Pipeline::new(config)?;
    info!(
        target: "errata::pipeline",
        strategy = %strategy,
        mode = ?mode,
        pages = pipeline.pages().len(),
        "Starting extraction run"
    );

    match strategy {
        FetchStrategy::Http => {
            let auth = HttpAuthenticator::new(config)?;
            let renderer = HttpRenderer::new(config);
            pipeline.run(&auth, &renderer, credentials, mode).await
        }
        FetchStrategy::Browser => {
            let wrapper = BrowserWrapper::launch(&LaunchOptions::from(config)).await?;
            let result = run_in_browser(&pipeline, wrapper.browser(), config, credentials, mode).await;
            wrapper.shutdown().await;
            result
        }
    }
}

/// Log in and fetch the first configured page, without extraction
pub async fn probe_with_strategy(
    config: &ErrataConfig,
    credentials: &Credentials,
    strategy: FetchStrategy,
) -> ErrataResult<AuthProbe> {
    let pipeline = Pipeline::new(config)?;
    info!(target: "errata::auth", strategy = %strategy, "Testing authentication");

    match strategy {
        FetchStrategy::Http => {
            let auth = HttpAuthenticator::new(config)?;
            let renderer = HttpRenderer::new(config);
            pipeline.probe(&auth, &renderer, credentials).await
        }
        FetchStrategy::Browser => {
            let wrapper = BrowserWrapper::launch(&LaunchOptions::from(config)).await?;
            let result = probe_in_browser(&pipeline, wrapper.browser(), config, credentials).await;
            wrapper.shutdown().await;
            result
        }
    }
}

async fn run_in_browser(
    pipeline: &Pipeline,
    browser: &Browser,
    config: &ErrataConfig,
    credentials: &Credentials,
    mode: MergeMode,
) -> ErrataResult<RunReport> {
    let auth = BrowserAuthenticator::new(browser, config)?;
    let renderer = BrowserRenderer::new(config);
    pipeline.run(&auth, &renderer, credentials, mode).await
}

async fn probe_in_browser(
    pipeline: &Pipeline,
    browser: &Browser,
    config: &ErrataConfig,
    credentials: &Credentials,
) -> ErrataResult<AuthProbe> {
    let auth = BrowserAuthenticator::new(browser, config)?;
    let renderer = BrowserRenderer::new(config);
    pipeline.probe(&auth, &renderer, credentials).await
}

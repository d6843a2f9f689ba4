//! Errata extraction pipeline
//!
//! Logs in to a curriculum site, renders the configured errata pages (opening
//! collapsed sections), extracts change records with configurable CSS
//! selectors, normalizes them and merges them into a deduplicated CSV dataset
//! with timestamped backups.
//!
//! ```no_run
//! use errata_locator::{Credentials, ErrataConfig, FetchStrategy, MergeMode, run_with_strategy};
//!
//! # async fn example() -> errata_locator::ErrataResult<()> {
//! let config = ErrataConfig::from_path("config/config.yaml")?;
//! let credentials = Credentials::from_env()?;
//! let report = run_with_strategy(&config, &credentials, FetchStrategy::Http, MergeMode::Incremental).await?;
//! println!("{}", report.outcome.as_str());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod browser;
pub mod config;
pub mod credentials;
pub mod dataset;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod setup;
pub mod utils;

pub use auth::{Authenticator, BrowserAuthenticator, HttpAuthenticator, Session};
pub use config::{ErrataConfig, PageSpec};
pub use credentials::Credentials;
pub use dataset::{Column, CsvStore, ErrataRecord, MergeMode, MergeStats, merge};
pub use errors::{AuthError, ConfigError, ErrataError, ErrataResult, FetchError, ValidationError};
pub use extract::{RawRecord, SelectorSet, extract};
pub use logging::init_logging;
pub use normalize::{PageContext, normalize};
pub use pipeline::{
    AuthProbe, FetchStrategy, PageReport, Pipeline, RunOutcome, RunReport, probe_with_strategy,
    run_with_strategy,
};
pub use render::{BrowserRenderer, HttpRenderer, RenderedPage, Renderer};
pub use setup::{SetupReport, validate_setup};

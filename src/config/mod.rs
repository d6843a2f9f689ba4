//! Configuration module
//!
//! `ErrataConfig` is loaded from YAML (`config/config.yaml` by default) or
//! built programmatically, and validated before any network activity.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod loader;
pub mod page;
pub mod types;

// Re-exports for public API
pub use builder::{ErrataConfigBuilder, WithBaseUrl};
pub use page::PageSpec;
pub use types::{
    ErrataConfig, LoggingConfig, LoginConfig, OutputConfig, PageEntry, ScrapingConfig,
    WebsiteConfig,
};

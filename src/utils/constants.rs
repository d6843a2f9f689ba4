//! Shared defaults
//!
//! Values used by configuration defaults, the renderers and the dataset writer.

/// Per-page budget for fetch, render and expansion combined
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 60;

/// Budget for a single HTTP request or CDP command
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Budget for the whole login flow
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 30;

/// How long the renderer waits for accordion sections to open
pub const DEFAULT_ACCORDION_TIMEOUT_SECS: u64 = 10;

/// Pause between page fetches
///
/// The site is a production curriculum platform; one page per second keeps
/// the run well below anything resembling load.
pub const DEFAULT_DELAY_BETWEEN_REQUESTS_MS: u64 = 1000;

/// Interval between readiness and expansion polls in the browser
pub const POLL_INTERVAL_MS: u64 = 250;

/// Chrome user agent sent by both strategies
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Default location of the YAML configuration
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Default dataset destination
pub const DEFAULT_CSV_PATH: &str = "output/errata_changes.csv";

/// Default backup directory
pub const DEFAULT_BACKUP_DIR: &str = "output/backups";

/// File name of the run summary written next to the CSV
pub const SUMMARY_FILE_NAME: &str = "extraction_summary.txt";

/// Format of the `Date_Extracted` column
pub const EXTRACTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp suffix of backup files
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

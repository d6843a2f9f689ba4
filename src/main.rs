// errata-locator: extract curriculum errata into a CSV dataset

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use errata_locator::utils::DEFAULT_CONFIG_PATH;
use errata_locator::{
    Credentials, ErrataConfig, ErrataError, FetchStrategy, MergeMode, init_logging,
    probe_with_strategy, run_with_strategy, validate_setup,
};

#[derive(Parser, Debug)]
#[command(
    name = "errata-locator",
    version,
    about = "Extract errata from authenticated curriculum pages into a CSV dataset"
)]
struct Cli {
    /// Path to the YAML configuration
    #[arg(long, env = "ERRATA_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Append only records not already in the dataset
    #[arg(short, long)]
    incremental: bool,

    /// Log in and fetch the first page, then stop
    #[arg(short = 't', long)]
    test_auth: bool,

    /// Check config, credentials, directories and browser, then stop
    #[arg(short = 'v', long)]
    validate_setup: bool,

    /// Use plain HTTP requests instead of a headless browser
    #[arg(short = 'r', long)]
    use_requests: bool,

    /// Log level; overrides `logging.level` (RUST_LOG overrides both)
    #[arg(long)]
    log_level: Option<String>,
}

fn exit_code_for(err: &ErrataError) -> ExitCode {
    match err {
        ErrataError::Config(_) => ExitCode::from(2),
        ErrataError::Auth(_) => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let strategy = FetchStrategy::from_use_requests(cli.use_requests);

    if cli.validate_setup {
        if let Err(e) = init_logging(cli.log_level.as_deref().unwrap_or("info"), None) {
            eprintln!("{e:#}");
        }
        let report = validate_setup(&cli.config, strategy).await;
        print!("{report}");
        return if report.all_passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let config = match ErrataConfig::from_path(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(config.log_level());
    if let Err(e) = init_logging(level, config.log_file()) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    if cli.test_auth {
        return match probe_with_strategy(&config, &credentials, strategy).await {
            Ok(probe) => {
                info!(
                    verified = probe.verified,
                    page = %probe.page_id,
                    url = %probe.url,
                    title = probe.title.as_deref().unwrap_or("-"),
                    bytes = probe.html_bytes,
                    "Authentication test passed"
                );
                if !probe.verified {
                    warn!("Session check after login was inconclusive, but the page loaded");
                }
                ExitCode::SUCCESS
            }
            Err(e) if !e.is_fatal() => {
                error!("Logged in, but the first page could not be fetched: {e}");
                exit_code_for(&e)
            }
            Err(e) => {
                error!("Authentication test failed: {e}");
                exit_code_for(&e)
            }
        };
    }

    let mode = if cli.incremental {
        MergeMode::Incremental
    } else {
        MergeMode::Full
    };

    match run_with_strategy(&config, &credentials, strategy, mode).await {
        Ok(report) => {
            info!(
                outcome = report.outcome.as_str(),
                pages_succeeded = report.pages_succeeded(),
                pages_failed = report.pages_failed(),
                records = report.records_extracted(),
                dropped = report.dropped_invalid,
                "Extraction complete"
            );
            for page in report.pages.iter().filter(|p| !p.succeeded()) {
                warn!(
                    page = %page.page_id,
                    "Page failed: {}",
                    page.error.as_deref().unwrap_or("unknown error")
                );
            }
            if let Some(path) = &report.summary_path {
                info!("Summary written to {}", path.display());
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                error!("Every page failed; the dataset was not modified");
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Run failed: {e}");
            exit_code_for(&e)
        }
    }
}

//! Chrome/Chromium discovery and launch

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::config::ErrataConfig;

/// Browser launch parameters, taken from `scraping.*`
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub accept_invalid_certs: bool,
    pub executable: Option<PathBuf>,
}

impl From<&ErrataConfig> for LaunchOptions {
    fn from(config: &ErrataConfig) -> Self {
        Self {
            headless: config.headless(),
            user_agent: config.user_agent().to_string(),
            request_timeout: config.request_timeout(),
            accept_invalid_certs: config.accept_invalid_certs(),
            executable: config.chrome_executable().map(Path::to_path_buf),
        }
    }
}

/// Find Chrome/Chromium executable on the system with platform-specific search paths.
///
/// `CHROMIUM_PATH` overrides everything else.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!(
                target: "errata::browser",
                "Using browser from CHROMIUM_PATH environment variable: {}",
                path.display()
            );
            return Ok(path);
        }
        warn!(
            target: "errata::browser",
            "CHROMIUM_PATH environment variable points to non-existent file: {}",
            path.display()
        );
    }

    for candidate in candidate_paths() {
        let Some(path) = resolve_candidate(candidate) else {
            continue;
        };
        if path.exists() {
            info!(target: "errata::browser", "Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if cfg!(not(target_os = "windows"))
        && let Some(path) = which_browser()
    {
        info!(target: "errata::browser", "Found browser on PATH: {}", path.display());
        return Ok(path);
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium executable not found (set CHROMIUM_PATH or scraping.chrome_executable)"
    ))
}

const WINDOWS_PATHS: &[&str] = &[
    r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
    r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
    r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

const MACOS_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "~/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/homebrew/bin/chromium",
];

const LINUX_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/local/bin/chromium",
    "/opt/google/chrome/chrome",
];

fn candidate_paths() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        WINDOWS_PATHS
    } else if cfg!(target_os = "macos") {
        MACOS_PATHS
    } else {
        LINUX_PATHS
    }
}

/// Expand `~/` and `%VAR%` in a candidate path
fn resolve_candidate(candidate: &str) -> Option<PathBuf> {
    if let Some(rest) = candidate.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    if candidate.contains('%') {
        return Some(PathBuf::from(expand_windows_env_vars(candidate)));
    }
    Some(PathBuf::from(candidate))
}

fn which_browser() -> Option<PathBuf> {
    ["chromium", "chromium-browser", "google-chrome", "chrome"]
        .iter()
        .find_map(|name| {
            let output = Command::new("which").arg(name).output().ok()?;
            if !output.status.success() {
                return None;
            }
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!found.is_empty()).then(|| PathBuf::from(found))
        })
}

/// Replace `%VAR%` tokens with environment values; unknown tokens are kept.
fn expand_windows_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) if !name.is_empty() => result.push_str(&value),
                    _ => {
                        result.push('%');
                        result.push_str(name);
                        result.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Download a managed Chromium into the user cache directory.
/// Returns a path to the downloaded executable.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!(target: "errata::browser", "Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                target: "errata::browser",
                "Could not determine cache directory, using temp directory fallback: {}",
                fallback.display()
            );
            fallback
        })
        .join("errata-locator")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!(
        target: "errata::browser",
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );
    Ok(revision_info.executable_path)
}

/// Flags for an unattended, profile-less session
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--password-store=basic",
    "--use-mock-keychain",
    "--mute-audio",
];

/// Launch a browser with a private profile directory.
///
/// Returns the browser, its CDP handler task and the profile directory. The
/// handler task must be aborted and the directory removed once the browser
/// has exited; [`BrowserWrapper`](super::BrowserWrapper) owns both.
pub async fn launch_browser(options: &LaunchOptions) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = match &options.executable {
        Some(path) => path.clone(),
        None => match find_browser_executable().await {
            Ok(path) => path,
            Err(_) => {
                warn!(target: "errata::browser", "No Chrome/Chromium executable found. Will download and use fetcher.");
                download_managed_browser().await?
            }
        },
    };

    let user_data_dir = std::env::temp_dir().join(format!(
        "errata_locator_chrome_{}_{}",
        std::process::id(),
        chrono::Utc::now().timestamp_millis()
    ));
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(options.request_timeout)
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path);

    if options.headless {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder.arg(format!("--user-agent={}", options.user_agent));
    for arg in LAUNCH_ARGS {
        config_builder = config_builder.arg(*arg);
    }

    if options.accept_invalid_certs {
        warn!(target: "errata::browser", "Browser will accept invalid TLS certificates");
        config_builder = config_builder.arg("--ignore-certificate-errors");
    }

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!(target: "errata::browser", headless = options.headless, "Launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                log_handler_error(&e.to_string());
            }
        }
        debug!(target: "errata::browser", "Browser handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}

/// Chrome emits CDP events chromiumoxide has no type for; those are noise
fn log_handler_error(message: &str) {
    let unknown_event = message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response");
    if unknown_event {
        trace!(target: "errata::browser", "Ignored unknown CDP message: {message}");
    } else {
        error!(target: "errata::browser", "Browser handler error: {message}");
    }
}

//! Scoped browser ownership

use std::path::PathBuf;

use anyhow::Result;
use chromiumoxide::browser::Browser;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::setup::{LaunchOptions, launch_browser};

/// Owns a launched browser, its CDP handler task and its profile directory.
///
/// Call [`shutdown`](Self::shutdown) when done. If the wrapper is dropped
/// instead (early return, panic unwinding), `Drop` aborts the handler, lets
/// `Browser`'s own drop kill the process and removes the profile directory.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    /// Launch a browser and take ownership of it
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let (browser, handler, user_data_dir) = launch_browser(options).await?;
        Ok(Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        })
    }

    /// Get reference to inner browser
    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser, wait for the process to exit and remove the profile
    pub async fn shutdown(mut self) {
        info!(target: "errata::browser", "Shutting down browser");

        if let Err(e) = self.browser.close().await {
            warn!(target: "errata::browser", "Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!(target: "errata::browser", "Failed to wait for browser exit: {}", e);
        }

        // Only safe once the process has released its file handles
        self.cleanup_temp_dir();
    }

    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!(target: "errata::browser", "Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    target: "errata::browser",
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();

        if self.user_data_dir.is_some() {
            warn!(target: "errata::browser", "BrowserWrapper dropped without shutdown - removing temp dir in Drop");
            self.cleanup_temp_dir();
        }
    }
}

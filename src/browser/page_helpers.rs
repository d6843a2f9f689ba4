//! Helper functions for consistent chromiumoxide Page handling

use std::time::{Duration, Instant};

use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::render::js_scripts::{READY_STATE_SCRIPT, has_element_script};
use crate::utils::POLL_INTERVAL_MS;

/// Get page URL, `"about:blank"` when unavailable
pub async fn get_page_url_with_fallback(page: &Page) -> String {
    match page.url().await {
        Ok(Some(url)) => url,
        Ok(None) => {
            trace!(target: "errata::browser", "Page URL is None (page not yet navigated)");
            "about:blank".to_string()
        }
        Err(e) => {
            trace!(target: "errata::browser", "Failed to get page URL (browser communication error): {}", e);
            "about:blank".to_string()
        }
    }
}

/// Evaluate a script and deserialize its result
pub async fn evaluate_value<T: DeserializeOwned>(page: &Page, script: &str) -> Result<T, String> {
    page.evaluate(script)
        .await
        .map_err(|e| e.to_string())?
        .into_value::<T>()
        .map_err(|e| e.to_string())
}

/// Poll until `document.readyState` is `complete`.
///
/// Returns `false` if `max_wait` elapsed first; callers decide whether a
/// partially loaded page is still usable.
pub async fn wait_for_page_load(page: &Page, max_wait: Duration) -> bool {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);

    loop {
        match evaluate_value::<serde_json::Value>(page, READY_STATE_SCRIPT).await {
            Ok(value) => {
                let ready_state = value.get("readyState").and_then(|v| v.as_str());
                let body_exists = value
                    .get("bodyExists")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                if ready_state == Some("complete") && body_exists {
                    debug!(
                        target: "errata::render",
                        "Page ready after {:.2}s",
                        start.elapsed().as_secs_f64()
                    );
                    return true;
                }
            }
            Err(e) => trace!(target: "errata::browser", "readyState probe failed: {}", e),
        }

        if start.elapsed() >= max_wait {
            warn!(
                target: "errata::render",
                "Timeout waiting for page load after {:?}, proceeding anyway",
                max_wait
            );
            return false;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Poll until an element matching `selector` exists
pub async fn wait_for_selector(page: &Page, selector: &str, max_wait: Duration) -> bool {
    let start = Instant::now();
    let script = has_element_script(selector);

    loop {
        if let Ok(true) = evaluate_value::<bool>(page, &script).await {
            return true;
        }
        if start.elapsed() >= max_wait {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

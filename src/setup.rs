//! `--validate-setup`: check the environment before a real run

use std::fmt;
use std::path::Path;

use crate::browser::find_browser_executable;
use crate::config::ErrataConfig;
use crate::credentials::Credentials;
use crate::pipeline::FetchStrategy;

/// One named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl SetupCheck {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub checks: Vec<SetupCheck>,
}

impl SetupReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

impl fmt::Display for SetupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            let mark = if check.passed { "PASS" } else { "FAIL" };
            writeln!(f, "[{mark}] {}: {}", check.name, check.detail)?;
        }
        Ok(())
    }
}

fn check_directory(name: &str, dir: &Path) -> SetupCheck {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    match std::fs::create_dir_all(dir) {
        Ok(()) => SetupCheck::pass(name, format!("{} is writable", dir.display())),
        Err(e) => SetupCheck::fail(name, format!("cannot create {}: {e}", dir.display())),
    }
}

/// Run every setup check. Later checks that need a valid config are skipped
/// when the config does not load.
pub async fn validate_setup(config_path: &Path, strategy: FetchStrategy) -> SetupReport {
    let mut report = SetupReport::default();

    let config = if config_path.exists() {
        match ErrataConfig::from_path(config_path) {
            Ok(config) => {
                report.checks.push(SetupCheck::pass(
                    "config",
                    format!(
                        "{} is valid ({} pages)",
                        config_path.display(),
                        config.errata_pages().len()
                    ),
                ));
                Some(config)
            }
            Err(e) => {
                report.checks.push(SetupCheck::fail("config", e.to_string()));
                None
            }
        }
    } else {
        report.checks.push(SetupCheck::fail(
            "config",
            format!("{} not found", config_path.display()),
        ));
        None
    };

    report.checks.push(match Credentials::from_env() {
        Ok(creds) => SetupCheck::pass("credentials", format!("user '{}'", creds.username())),
        Err(e) => SetupCheck::fail("credentials", e.to_string()),
    });

    if let Some(config) = &config {
        let csv_dir = config.csv_path().parent().unwrap_or_else(|| Path::new("."));
        report.checks.push(check_directory("output directory", csv_dir));
        report
            .checks
            .push(check_directory("backup directory", config.backup_path()));
    }

    if strategy == FetchStrategy::Browser {
        let configured = config
            .as_ref()
            .and_then(|c| c.chrome_executable())
            .filter(|p| p.exists());
        report.checks.push(match configured {
            Some(path) => SetupCheck::pass("browser", format!("configured at {}", path.display())),
            None => match find_browser_executable().await {
                Ok(path) => SetupCheck::pass("browser", format!("found at {}", path.display())),
                Err(e) => SetupCheck::fail(
                    "browser",
                    format!("{e:#}; install Chrome/Chromium, set CHROMIUM_PATH, or use --use-requests"),
                ),
            },
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_config_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = validate_setup(&dir.path().join("nope.yaml"), FetchStrategy::Http).await;
        let config = report
            .checks
            .iter()
            .find(|c| c.name == "config")
            .expect("config check present");
        assert!(!config.passed);
        assert!(!report.all_passed());
        assert!(report.to_string().contains("[FAIL] config"));
    }

    #[test]
    fn directory_check_creates_missing_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let check = check_directory("output directory", &nested);
        assert!(check.passed);
        assert!(nested.is_dir());
    }
}

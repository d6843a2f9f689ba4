//! Site credentials, read from the environment or a `.env` file

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::errors::ConfigError;

/// Username/password pair. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `ERRATA_USERNAME`/`ERRATA_PASSWORD`, falling back to `USERNAME`/`PASSWORD`.
    ///
    /// The process environment wins; anything it lacks is read from a `.env`
    /// file in the working directory or one of its parents.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = match dotenvy::dotenv_iter() {
            Ok(iter) => read_env_file(iter, ".env")?,
            Err(e) if e.not_found() => {
                debug!(target: "errata::config", "No .env file found, using process environment only");
                HashMap::new()
            }
            Err(e) => return Err(ConfigError::Parse(format!(".env: {e}"))),
        };
        Self::from_env_and(&file)
    }

    /// Like [`from_env`](Self::from_env) with an explicit env file
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let label = path.display().to_string();
        let iter = dotenvy::from_path_iter(path)
            .map_err(|e| ConfigError::Parse(format!("{label}: {e}")))?;
        Self::from_env_and(&read_env_file(iter, &label)?)
    }

    fn from_env_and(file: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |primary: &str, fallback: &str| {
            lookup(primary)
                .or_else(|| lookup(fallback))
                .filter(|v| !v.trim().is_empty())
        };

        let username = read("ERRATA_USERNAME", "USERNAME")
            .ok_or_else(|| ConfigError::MissingCredentials("ERRATA_USERNAME".to_string()))?;
        let password = read("ERRATA_PASSWORD", "PASSWORD")
            .ok_or_else(|| ConfigError::MissingCredentials("ERRATA_PASSWORD".to_string()))?;

        Ok(Self { username, password })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

fn read_env_file(
    iter: impl Iterator<Item = Result<(String, String), dotenvy::Error>>,
    label: &str,
) -> Result<HashMap<String, String>, ConfigError> {
    let vars = iter
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(|e| ConfigError::Parse(format!("{label}: {e}")))?;
    debug!(target: "errata::config", file = label, vars = vars.len(), "Read env file");
    Ok(vars)
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

//! Connection settings resolution.
//!
//! Settings come from command line flags (which clap already fills from the
//! `ELASTICSEARCH_*` environment variables), then from the legacy
//! `ELASTICSEARCH_USERNAME` variable, then from the optional YAML file given
//! with `--config`. The first source that sets a value wins.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::CheckError;

/// Alternate environment variable for the username.
pub const USERNAME_ENV_FALLBACK: &str = "ELASTICSEARCH_USERNAME";

/// Connection settings that may be only partially set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialSettings {
    /// Cluster URL.
    pub url: Option<String>,
    /// Basic-auth user.
    pub user: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
}

impl PartialSettings {
    /// Load settings from a YAML file using the flag names as keys.
    ///
    /// ```yaml
    /// url: https://es.example.com:9200
    /// user: monitoring
    /// password: secret
    /// ```
    ///
    /// # Errors
    /// Returns [`CheckError::Config`] if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self, CheckError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CheckError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loading configuration file");

        // An empty file deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| {
            CheckError::Config(format!("failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Settings taken from [`USERNAME_ENV_FALLBACK`].
    #[must_use]
    pub fn from_env_fallback() -> Self {
        Self {
            user: std::env::var(USERNAME_ENV_FALLBACK).ok(),
            ..Self::default()
        }
    }

    /// Fill every unset (or empty) field from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            url: non_empty(self.url).or_else(|| non_empty(fallback.url)),
            user: non_empty(self.user).or_else(|| non_empty(fallback.user)),
            password: non_empty(self.password).or_else(|| non_empty(fallback.password)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Fully resolved settings used to build the cluster client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Cluster URL.
    pub url: String,
    /// Basic-auth user, empty when unset.
    pub username: String,
    /// Basic-auth password, empty when unset.
    pub password: String,
    /// Accept any server certificate.
    pub skip_tls_verify: bool,
}

impl ConnectionSettings {
    /// Resolve the final settings.
    ///
    /// # Errors
    /// Returns [`CheckError::Config`] if no URL was provided by any source.
    pub fn resolve(partial: PartialSettings, skip_tls_verify: bool) -> Result<Self, CheckError> {
        let url = non_empty(partial.url)
            .ok_or_else(|| CheckError::Config("You must set --url parameter".to_string()))?;

        Ok(Self {
            url,
            username: partial.user.unwrap_or_default(),
            password: partial.password.unwrap_or_default(),
            skip_tls_verify,
        })
    }
}

use std::time::Duration;

use caviar_core::codes::{is_known_country, DEFAULT_COUNTRY};
use caviar_core::normalize::NormalizeDefaults;

use crate::error::ConfigError;
use crate::list_store::WritePolicy;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost:8080`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend API root (default: `http://localhost:8080/api/v1`).
    pub api_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Country applied to records that carry none (default: `FR`).
    pub default_country: String,
    /// Ordering of overlapping writes on the same record.
    pub write_policy: WritePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api/v1".to_string(),
            request_timeout_secs: 30,
            default_country: DEFAULT_COUNTRY.to_string(),
            write_policy: WritePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                        |
    /// |-------------------------------|--------------------------------|
    /// | `CAVIAR_API_URL`              | `http://localhost:8080/api/v1` |
    /// | `CAVIAR_REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `CAVIAR_DEFAULT_COUNTRY`      | `FR`                           |
    /// | `CAVIAR_WRITE_POLICY`         | `discard_stale`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("CAVIAR_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let request_timeout_secs = match lookup("CAVIAR_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CAVIAR_REQUEST_TIMEOUT_SECS",
                        reason: format!("expected a positive number of seconds, got '{raw}'"),
                    })
                }
            },
            None => defaults.request_timeout_secs,
        };

        let default_country = match lookup("CAVIAR_DEFAULT_COUNTRY") {
            Some(raw) => {
                let code = raw.trim().to_ascii_uppercase();
                if !is_known_country(&code) {
                    return Err(ConfigError::Invalid {
                        key: "CAVIAR_DEFAULT_COUNTRY",
                        reason: format!("unsupported country code '{raw}'"),
                    });
                }
                code
            }
            None => defaults.default_country,
        };

        let write_policy = match lookup("CAVIAR_WRITE_POLICY") {
            Some(raw) => raw
                .parse::<WritePolicy>()
                .map_err(|reason| ConfigError::Invalid {
                    key: "CAVIAR_WRITE_POLICY",
                    reason,
                })?,
            None => defaults.write_policy,
        };

        Ok(Self {
            api_url,
            request_timeout_secs,
            default_country,
            write_policy,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn normalize_defaults(&self) -> NormalizeDefaults {
        NormalizeDefaults::new(self.default_country.clone())
    }
}

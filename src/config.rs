//! Configuration loaded from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TicketdeskError};

/// Runtime configuration for the API client and the check-in controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the ticketing REST API, without a trailing slash.
    pub api_base_url: String,
    /// Upper bound for a single API request.
    pub request_timeout: Duration,
    /// How long a scan result stays on screen before scanning resumes.
    pub feedback_interval: Duration,
    /// Pause between stopping and restarting the reader on an event switch.
    pub restart_delay: Duration,
    /// Log filter used by the binaries (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_secs(10),
            feedback_interval: Duration::from_secs(2),
            restart_delay: Duration::from_millis(300),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `TICKETDESK_*` environment variables.
    ///
    /// Unset variables fall back to [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns [`TicketdeskError::Config`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let api_base_url = lookup("TICKETDESK_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        Ok(Self {
            api_base_url,
            request_timeout: millis(&lookup, "TICKETDESK_REQUEST_TIMEOUT_MS")?
                .unwrap_or(defaults.request_timeout),
            feedback_interval: millis(&lookup, "TICKETDESK_FEEDBACK_MS")?
                .unwrap_or(defaults.feedback_interval),
            restart_delay: millis(&lookup, "TICKETDESK_RESTART_DELAY_MS")?
                .unwrap_or(defaults.restart_delay),
            log_level: lookup("TICKETDESK_LOG").unwrap_or(defaults.log_level),
        })
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<Duration>> {
    lookup(key)
        .map(|raw| {
            u64::from_str(raw.trim())
                .map(Duration::from_millis)
                .map_err(|e| TicketdeskError::Config {
                    key,
                    reason: e.to_string(),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.feedback_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TICKETDESK_API_URL", "https://tickets.example.com/api/"),
            ("TICKETDESK_FEEDBACK_MS", "1500"),
            ("TICKETDESK_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://tickets.example.com/api");
        assert_eq!(config.feedback_interval, Duration::from_millis(1500));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("TICKETDESK_REQUEST_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            TicketdeskError::Config {
                key: "TICKETDESK_REQUEST_TIMEOUT_MS",
                ..
            }
        ));
    }
}

//! Client configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::HostAgentError;
use crate::validation::{validate_api_key, validate_timeout_ms};

pub const DEFAULT_URL: &str = "http://127.0.0.1:5454";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_PREFS_PATH: &str = "hostagent.toml";

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub prefs_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
        }
    }
}

impl ClientConfig {
    /// Reads `HOSTAGENT_URL`, `HOSTAGENT_API_KEY`, `HOSTAGENT_TIMEOUT_MS` and
    /// `HOSTAGENT_PREFS`. Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let url = match lookup("HOSTAGENT_URL") {
            Some(raw) => Url::parse(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring HOSTAGENT_URL={}: {}", raw, e);
                defaults.url.clone()
            }),
            None => defaults.url.clone(),
        };

        let timeout = match lookup("HOSTAGENT_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| HostAgentError::InvalidInput(e.to_string()))
                .and_then(validate_timeout_ms)
                .unwrap_or_else(|e| {
                    tracing::warn!("Ignoring HOSTAGENT_TIMEOUT_MS={}: {}", raw, e);
                    defaults.timeout
                }),
            None => defaults.timeout,
        };

        Self {
            url,
            api_key: lookup("HOSTAGENT_API_KEY").and_then(|raw| {
                validate_api_key(&raw)
                    .map_err(|e| tracing::warn!("Ignoring HOSTAGENT_API_KEY: {}", e))
                    .ok()
            }),
            timeout,
            prefs_path: lookup("HOSTAGENT_PREFS")
                .map(PathBuf::from)
                .unwrap_or(defaults.prefs_path),
        }
    }
}

fn default_url() -> Url {
    Url::parse(DEFAULT_URL).expect("default url is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.url.as_str(), "http://127.0.0.1:5454/");
        assert_eq!(cfg.timeout, Duration::from_millis(5000));
    }

    #[test]
    fn reads_every_variable() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("HOSTAGENT_URL", "https://agent.example:8443"),
            ("HOSTAGENT_API_KEY", " abc\n"),
            ("HOSTAGENT_TIMEOUT_MS", "1500"),
            ("HOSTAGENT_PREFS", "/tmp/p.toml"),
        ]));
        assert_eq!(cfg.url.host_str(), Some("agent.example"));
        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.timeout, Duration::from_millis(1500));
        assert_eq!(cfg.prefs_path, PathBuf::from("/tmp/p.toml"));
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("HOSTAGENT_URL", "::nope::"),
            ("HOSTAGENT_TIMEOUT_MS", "0"),
            ("HOSTAGENT_API_KEY", "  "),
        ]));
        assert_eq!(cfg.url, ClientConfig::default().url);
        assert_eq!(cfg.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(cfg.api_key, None);

        let cfg = ClientConfig::from_lookup(lookup(&[("HOSTAGENT_TIMEOUT_MS", "soon")]));
        assert_eq!(cfg.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }
}

//! Server configuration from environment variables

use crate::state_machine::ScriptTiming;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Base URL of the analysis service; scripted content is used without one
    pub backend_url: Option<String>,
    pub backend_timeout: Duration,
    pub timing: ScriptTiming,
    /// Idle sessions are dropped after this long; `None` keeps them forever
    pub session_ttl: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: None,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            timing: ScriptTiming::default(),
            session_ttl: Some(Duration::from_secs(DEFAULT_SESSION_TTL_SECS)),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset and blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("STARTUP_HUNTER_PORT") {
            Some(v) => parse("STARTUP_HUNTER_PORT", &v)?,
            None => defaults.port,
        };

        let backend_timeout = match get("STARTUP_HUNTER_BACKEND_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = parse("STARTUP_HUNTER_BACKEND_TIMEOUT_SECS", &v)?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "STARTUP_HUNTER_BACKEND_TIMEOUT_SECS",
                        value: v,
                        reason: "must be at least 1".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.backend_timeout,
        };

        let timing = match get("STARTUP_HUNTER_DELAY_SCALE") {
            Some(v) => ScriptTiming {
                scale_percent: parse("STARTUP_HUNTER_DELAY_SCALE", &v)?,
            },
            None => defaults.timing,
        };

        let session_ttl = match get("STARTUP_HUNTER_SESSION_TTL_SECS") {
            Some(v) => match parse("STARTUP_HUNTER_SESSION_TTL_SECS", &v)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.session_ttl,
        };

        let backend_url = match get("STARTUP_HUNTER_BACKEND_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Some(url),
            Some(url) => {
                return Err(ConfigError::Invalid {
                    name: "STARTUP_HUNTER_BACKEND_URL",
                    value: url,
                    reason: "expected an http(s) URL".to_string(),
                })
            }
            None => None,
        };

        Ok(Self {
            port,
            backend_url,
            backend_timeout,
            timing,
            session_ttl,
        })
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.backend_url, None);
        assert_eq!(config.timing.scale_percent, 100);
    }

    #[test]
    fn test_all_values() {
        let config = config(&[
            ("STARTUP_HUNTER_PORT", "9100"),
            ("STARTUP_HUNTER_BACKEND_URL", "http://localhost:8080"),
            ("STARTUP_HUNTER_BACKEND_TIMEOUT_SECS", "5"),
            ("STARTUP_HUNTER_DELAY_SCALE", "0"),
        ])
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.backend_timeout, Duration::from_secs(5));
        assert_eq!(config.timing, ScriptTiming::instant());
        assert_eq!(config.session_ttl, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let disabled = config(&[("STARTUP_HUNTER_SESSION_TTL_SECS", "0")]).unwrap();
        assert_eq!(disabled.session_ttl, None);
        let short = config(&[("STARTUP_HUNTER_SESSION_TTL_SECS", "90")]).unwrap();
        assert_eq!(short.session_ttl, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_blank_url_means_unset() {
        let config = config(&[("STARTUP_HUNTER_BACKEND_URL", "  ")]).unwrap();
        assert_eq!(config.backend_url, None);
    }

    #[test]
    fn test_bad_values_fail() {
        assert!(matches!(
            config(&[("STARTUP_HUNTER_PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "STARTUP_HUNTER_PORT", .. })
        ));
        assert!(config(&[("STARTUP_HUNTER_BACKEND_TIMEOUT_SECS", "0")]).is_err());
        assert!(config(&[("STARTUP_HUNTER_DELAY_SCALE", "-5")]).is_err());
        assert!(config(&[("STARTUP_HUNTER_BACKEND_URL", "localhost:8080")]).is_err());
    }
}

//! Client configuration
//!
//! Settings are resolved from, in increasing precedence:
//! - Default values
//! - A configuration file (JSON or TOML)
//! - Environment variables

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Transport-level settings shared by every request of a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default request timeout in seconds, used when a request does not set one
    pub request_timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
    /// Value for the `User-Agent` header
    pub user_agent: Option<String>,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 100,
            connect_timeout_secs: 10,
            user_agent: None,
            validate_tls: true,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Set the request timeout; the connect timeout is lowered to fit
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self.connect_timeout_secs = self.connect_timeout_secs.min(secs);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Load from a `.json` or `.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("Failed to read config file {}", path.display()),
            source: e,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let config: ClientConfig = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content).map_err(|e| Error::Configuration {
                message: format!("Invalid TOML in {}", path.display()),
                source: Some(e.into()),
            })?,
            _ => {
                return Err(Error::configuration(format!(
                    "Unsupported config file format: {}",
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("SMARTHTTP_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("SMARTHTTP_TIMEOUT_SECS", &value)?;
        }

        if let Ok(value) = std::env::var("SMARTHTTP_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = parse_secs("SMARTHTTP_CONNECT_TIMEOUT_SECS", &value)?;
        }

        if let Ok(value) = std::env::var("SMARTHTTP_USER_AGENT") {
            self.user_agent = Some(value);
        }

        Ok(())
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::configuration("Request timeout cannot be zero"));
        }

        if self.connect_timeout_secs == 0 {
            return Err(Error::configuration("Connect timeout cannot be zero"));
        }

        if self.connect_timeout_secs > self.request_timeout_secs {
            return Err(Error::configuration(
                "Connect timeout should be <= request timeout",
            ));
        }

        Ok(())
    }
}

fn parse_secs(var: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| Error::Configuration {
        message: format!("{} must be a whole number of seconds, got '{}'", var, value),
        source: Some(e.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: [&str; 3] = [
        "SMARTHTTP_TIMEOUT_SECS",
        "SMARTHTTP_CONNECT_TIMEOUT_SECS",
        "SMARTHTTP_USER_AGENT",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(100));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate_tls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = ClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 5;
        config.connect_timeout_secs = 10;
        assert!(config.validate().is_err());

        config.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_secs = 30\nuser_agent = \"smarthttp-test\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.user_agent.as_deref(), Some("smarthttp-test"));
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"connect_timeout_secs": 3, "validate_tls": false}}"#).unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.connect_timeout_secs, 3);
        assert!(!config.validate_tls);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_secs = 0").unwrap();
        assert!(ClientConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_short_request_timeout_clamps_connect_timeout() {
        let config = ClientConfig::default().with_request_timeout(5);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 5);
        assert!(config.validate().is_ok());

        let config = ClientConfig::default().with_request_timeout(300);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("SMARTHTTP_TIMEOUT_SECS", "45");
        std::env::set_var("SMARTHTTP_CONNECT_TIMEOUT_SECS", " 4 ");
        std::env::set_var("SMARTHTTP_USER_AGENT", "env-agent/1.0");

        let config = ClientConfig::from_env();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.request_timeout_secs, 45);
        assert_eq!(config.connect_timeout_secs, 4);
        assert_eq!(config.user_agent.as_deref(), Some("env-agent/1.0"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_secs = 30\nuser_agent = \"from-file\"").unwrap();
        let mut config = ClientConfig::from_file(file.path()).unwrap();

        std::env::set_var("SMARTHTTP_USER_AGENT", "from-env");
        let merged = config.merge_with_env();
        clear_env();

        merged.unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.user_agent.as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn test_env_invalid_number_rejected() {
        clear_env();
        std::env::set_var("SMARTHTTP_TIMEOUT_SECS", "soon");
        let result = ClientConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    #[serial]
    fn test_env_values_are_validated() {
        clear_env();
        std::env::set_var("SMARTHTTP_TIMEOUT_SECS", "3");
        let result = ClientConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", " 15 ").unwrap(), 15);
        assert!(parse_secs("X", "fast").is_err());
    }
}

//! Runtime configuration.
//!
//! The coordinator password has no implicit default. Operators that really
//! want the well-known fallback secret must ask for it with
//! [`SyncConfig::with_default_password`].

use std::env;
use std::time::Duration;

use super::error::SyncError;
use super::log::Severity;

/// Fallback shared secret used by unconfigured servers.
pub const DEFAULT_PASSWORD: &str =
    "thisisthepasswordthatisusedwithoutconfiguringapasswordformaincoordinator";

/// Default server host.
pub const DEFAULT_HOST: &str = "beatsaber.networkauditor.org";

/// Default server port.
pub const DEFAULT_PORT: u16 = 10157;

/// How long a coordinator connect may wait for its name to be announced.
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Shared secret a coordinator must present to become the main coordinator
    pub password: String,

    /// Whether log lines are emitted at all
    pub log_enabled: bool,

    /// Lowest severity that is emitted
    pub min_severity: Severity,

    /// Bound on waiting for a connecting coordinator's name
    pub resolution_timeout: Duration,

    pub host: String,
    pub port: u16,
}

impl SyncConfig {
    /// Create a configuration with an explicit password and default values.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            log_enabled: false,
            min_severity: Severity::Info,
            resolution_timeout: DEFAULT_RESOLUTION_TIMEOUT,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Opt in to the well-known fallback password.
    pub fn with_default_password() -> Self {
        Self::new(DEFAULT_PASSWORD)
    }

    pub fn with_logging(mut self, min_severity: Severity) -> Self {
        self.log_enabled = true;
        self.min_severity = min_severity;
        self
    }

    pub fn with_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.resolution_timeout = timeout;
        self
    }

    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Socket URL for the transport.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    /// Load configuration from environment variables.
    ///
    /// `OVERLAY_PASSWORD` is required. `OVERLAY_LOG`, `OVERLAY_LOG_LEVEL`,
    /// `OVERLAY_RESOLUTION_TIMEOUT_MS`, `OVERLAY_HOST` and `OVERLAY_PORT` fall
    /// back to the defaults when unset.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SyncError> {
        let password = lookup("OVERLAY_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or(SyncError::MissingPassword)?;
        let mut config = Self::new(password);

        if let Some(value) = lookup("OVERLAY_LOG") {
            config.log_enabled = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid("OVERLAY_LOG", value)),
            };
        }

        if let Some(value) = lookup("OVERLAY_LOG_LEVEL") {
            config.min_severity = value
                .parse()
                .map_err(|_| invalid("OVERLAY_LOG_LEVEL", value.clone()))?;
        }

        if let Some(value) = lookup("OVERLAY_RESOLUTION_TIMEOUT_MS") {
            let ms = value
                .parse::<u64>()
                .map_err(|_| invalid("OVERLAY_RESOLUTION_TIMEOUT_MS", value.clone()))?;
            config.resolution_timeout = Duration::from_millis(ms);
        }

        if let Some(host) = lookup("OVERLAY_HOST") {
            config.host = host;
        }

        if let Some(value) = lookup("OVERLAY_PORT") {
            config.port = value
                .parse()
                .map_err(|_| invalid("OVERLAY_PORT", value.clone()))?;
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: String) -> SyncError {
    SyncError::InvalidConfig { key, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::new("secret");
        assert!(!config.log_enabled);
        assert_eq!(config.min_severity, Severity::Info);
        assert_eq!(config.url(), "ws://beatsaber.networkauditor.org:10157");
        assert_eq!(SyncConfig::with_default_password().password, DEFAULT_PASSWORD);
    }

    #[test]
    fn test_env_requires_password() {
        let err = SyncConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, SyncError::MissingPassword));

        let err = SyncConfig::from_lookup(lookup(&[("OVERLAY_PASSWORD", "")])).unwrap_err();
        assert!(matches!(err, SyncError::MissingPassword));
    }

    #[test]
    fn test_env_overrides() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("OVERLAY_PASSWORD", "pw"),
            ("OVERLAY_LOG", "true"),
            ("OVERLAY_LOG_LEVEL", "debug"),
            ("OVERLAY_RESOLUTION_TIMEOUT_MS", "250"),
            ("OVERLAY_HOST", "localhost"),
            ("OVERLAY_PORT", "2052"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            SyncConfig::new("pw")
                .with_logging(Severity::Debug)
                .with_resolution_timeout(Duration::from_millis(250))
                .with_server("localhost", 2052)
        );
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = SyncConfig::from_lookup(lookup(&[
            ("OVERLAY_PASSWORD", "pw"),
            ("OVERLAY_PORT", "http"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid value \"http\" for OVERLAY_PORT");
    }
}

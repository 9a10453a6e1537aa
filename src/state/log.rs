//! Severity-filtered logging onto the `log` channel.
//!
//! Lines that pass the filter are also mirrored to `tracing`.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};

use super::notify::Notifier;

/// Log severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(()),
        }
    }
}

/// Filter configured once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    enabled: bool,
    min_severity: Severity,
}

impl Logger {
    pub fn new(enabled: bool, min_severity: Severity) -> Self {
        Self {
            enabled,
            min_severity,
        }
    }

    /// Check if a line at this severity would be emitted.
    pub fn accepts(&self, severity: Severity) -> bool {
        self.enabled && severity >= self.min_severity
    }

    /// Emit a line. `message` only runs when the filter passes.
    pub fn log<F, S>(&self, notifier: &mut Notifier, severity: Severity, message: F)
    where
        F: FnOnce() -> S,
        S: fmt::Display,
    {
        if !self.accepts(severity) {
            return;
        }

        let message = message().to_string();
        match severity {
            Severity::Debug => tracing::debug!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Warn => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }

        let line = format!(
            "[{}]({}): {}",
            severity,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message
        );
        notifier.log(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn capture(notifier: &mut Notifier) -> Arc<Mutex<Vec<String>>> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        notifier.on_log(move |line| sink.lock().unwrap().push(line.to_string()));
        lines
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warn));
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_threshold_filters() {
        let mut notifier = Notifier::new();
        let lines = capture(&mut notifier);
        let logger = Logger::new(true, Severity::Warn);

        logger.log(&mut notifier, Severity::Info, || "quiet");
        logger.log(&mut notifier, Severity::Error, || "loud");

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[Error]("));
        assert!(lines[0].ends_with("Z): loud"));
    }

    #[test]
    fn test_disabled_never_formats() {
        let mut notifier = Notifier::new();
        let lines = capture(&mut notifier);
        let logger = Logger::new(false, Severity::Debug);

        let mut formatted = false;
        logger.log(&mut notifier, Severity::Error, || {
            formatted = true;
            "never"
        });

        assert!(!formatted);
        assert!(lines.lock().unwrap().is_empty());
    }
}

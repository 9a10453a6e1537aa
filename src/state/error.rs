//! Errors surfaced by the overlay state mirror.

use std::time::Duration;

/// Everything that can go wrong while mirroring overlay state.
///
/// None of these are fatal to the dispatch loop; they are reported on the
/// error channel and the offending message or request is dropped.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Inbound text was not a well-formed packet.
    #[error("failed to decode packet: {0}")]
    Decode(#[from] serde_json::Error),

    /// A coordinator connected but its name never showed up in the roster.
    #[error("coordinator {name:?} was not announced within {waited:?}")]
    ResolutionTimeout { name: String, waited: Duration },

    /// No shared secret was configured.
    #[error("no coordinator password configured")]
    MissingPassword,

    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },

    /// The outbound sink refused a message.
    #[error("transport error: {0}")]
    Transport(String),
}

impl SyncError {
    /// Check if this error came from a malformed inbound message.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Check if this error is a coordinator resolution timeout.
    pub fn is_resolution_timeout(&self) -> bool {
        matches!(self, Self::ResolutionTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_from_json() {
        let err: SyncError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_decode());
        assert!(!err.is_resolution_timeout());
        assert!(err.to_string().starts_with("failed to decode packet"));
    }

    #[test]
    fn test_resolution_timeout_display() {
        let err = SyncError::ResolutionTimeout {
            name: "Moon".to_string(),
            waited: Duration::from_secs(5),
        };
        assert!(err.is_resolution_timeout());
        assert_eq!(
            err.to_string(),
            "coordinator \"Moon\" was not announced within 5s"
        );
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown time zone description: {0}")]
    UnknownTimeZone(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Item source error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures reported by the content store while listing items or folders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The store asked us to slow down (HTTP 429 or equivalent).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other failure that may succeed on a later attempt.
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl SourceError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, SourceError::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_time_zone_display() {
        let err = ReconcileError::UnknownTimeZone("(UTC+01:00) Paris".into());
        assert_eq!(
            err.to_string(),
            "Unknown time zone description: (UTC+01:00) Paris"
        );
    }

    #[test]
    fn source_error_converts() {
        let err: ReconcileError = SourceError::Transient("socket closed".into()).into();
        assert_eq!(
            err.to_string(),
            "Item source error: transient failure: socket closed"
        );
    }

    #[test]
    fn rate_limit_is_distinguishable() {
        assert!(SourceError::RateLimited("429".into()).is_rate_limit());
        assert!(!SourceError::Transient("timeout".into()).is_rate_limit());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReconcileError>();
    }
}

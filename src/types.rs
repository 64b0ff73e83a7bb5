use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single Emby API call.
///
/// A 404 is not an error: the endpoint simply doesn't exist on that server
/// version and the call yields `Ok(None)`.
#[derive(Debug, Error)]
pub enum EmbyError {
    #[error("Authentication failed")]
    Auth,

    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Unknown error: {0}")]
    Unknown(#[source] BoxError),
}

impl EmbyError {
    pub fn unknown(cause: impl Into<BoxError>) -> Self {
        Self::Unknown(cause.into())
    }

    /// Sort a transport error into the taxonomy.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::Connect(err)
        } else {
            Self::Unknown(Box::new(err))
        }
    }
}

/// Application-level errors outside of individual API calls.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Emby API error: {0}")]
    Emby(#[from] EmbyError),

    #[error("No API key configured (set api_key in config.json or EMBY_API_KEY)")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keeps_the_cause() {
        let err = EmbyError::unknown("unexpected body");
        assert_eq!(err.to_string(), "Unknown error: unexpected body");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn api_errors_convert_into_monitor_errors() {
        let err: MonitorError = EmbyError::Auth.into();
        assert!(matches!(err, MonitorError::Emby(EmbyError::Auth)));
    }
}

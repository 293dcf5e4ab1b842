//! Error types for widget actions.

use thiserror::Error;

/// Failure of a backend call triggered by a user action.
///
/// The three variants let the UI pick a message without string matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// Transport failure, or a body that could not be understood.
    #[error("{0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// A 2xx response that carried an `error` field.
    #[error("{0}")]
    Application(String),
}

impl WidgetError {
    /// Short tag used in log events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Application(_) => "application",
        }
    }
}

impl From<reqwest::Error> for WidgetError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
            };
        }
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Network(format!("invalid response body: {err}"))
    }
}

/// Result type alias for widget backend calls.
pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_mentions_status() {
        let err = WidgetError::Http { status: 502 };
        assert_eq!(err.to_string(), "HTTP error! status: 502");
        assert_eq!(err.kind(), "http");
    }

    #[test]
    fn test_application_error_is_verbatim() {
        let err = WidgetError::Application("No message or image provided".into());
        assert_eq!(err.to_string(), "No message or image provided");
    }

    #[test]
    fn test_json_error_is_network_class() {
        let err: WidgetError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, WidgetError::Network(_)));
        assert!(err.to_string().starts_with("invalid response body"));
    }
}

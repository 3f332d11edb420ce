//! HTTP error type

use thiserror::Error;

/// Errors returned by [`super::ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or body decoding failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the bearer token; the stored token has been cleared
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Any other non-success status
    #[error("Server error {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the body, or the canonical reason
        message: String,
    },

    /// The body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Malformed(String),

    /// Reading or writing the token failed
    #[error("Token storage failed: {0:#}")]
    Storage(anyhow::Error),
}

impl ApiError {
    /// Whether the session was dropped because of this error
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Short message suitable for a status bar or form error
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Transport(e) if e.is_timeout() => "Request timed out".to_string(),
            Self::Transport(e) if e.is_connect() => "Could not reach the server".to_string(),
            other => other.to_string(),
        }
    }

    /// Build a [`ApiError::Status`] from a response body
    pub(crate) fn from_body(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["error", "message"]
                    .iter()
                    .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Self::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_message_from_error_field() {
        let err = ApiError::from_body(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":"Invalid code"}"#);
        assert_eq!(err.user_message(), "Invalid code");
    }

    #[test]
    fn test_message_from_message_field() {
        let err = ApiError::from_body(StatusCode::BAD_REQUEST, r#"{"message":"Email taken"}"#);
        assert_eq!(err.user_message(), "Email taken");
    }

    #[test]
    fn test_message_falls_back_to_reason() {
        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.user_message(), "Internal Server Error");
    }
}

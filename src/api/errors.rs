use serde_json::Value;
use thiserror::Error;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    /// The request never reached the server.
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    /// Non-2xx response. `message` is only set when the body carried one.
    #[error("Request failed ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Http {
        status: u16,
        message: Option<String>,
        body: Option<String>,
    },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    /// A protected endpoint was called with no session in storage.
    #[error("Not signed in")]
    MissingSession,
}

impl ApiError {
    /// Builds an HTTP error from a raw response body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let body = (!trimmed.is_empty()).then(|| trimmed.to_string());
        Self::Http {
            status,
            message: extract_message(trimmed),
            body,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Message the server put in the error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text for a transient user notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the server. Check your connection and try again."
                .to_string(),
            Self::Timeout(_) => "Request timed out. Please try again.".to_string(),
            Self::Http {
                status, message, ..
            } => message
                .clone()
                .unwrap_or_else(|| format!("Request failed with status {status}")),
            Self::Parse(_) => "Unexpected response from the server.".to_string(),
            Self::Serialization(message) => message.clone(),
            Self::MissingSession => "Your session has ended. Please log in again.".to_string(),
        }
    }
}

/// Pulls a human readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(json) => json_message(&json).map(truncate),
        // Plain-text bodies are shown as-is.
        Err(_) => Some(truncate(body)),
    }
}

fn json_message(json: &Value) -> Option<&str> {
    let candidates = [
        json.get("message"),
        json.get("error").and_then(|error| error.get("message")),
        json.get("error"),
        json.get("errors").and_then(|errors| errors.get(0)),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|message| !message.is_empty())
}

fn truncate(message: &str) -> String {
    message.trim().chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_response_prefers_json_message() {
        let err = ApiError::from_response(400, r#"{"success":false,"message":"Invalid OTP"}"#);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.server_message(), Some("Invalid OTP"));
        assert_eq!(err.user_message(), "Invalid OTP");
    }

    #[test]
    fn from_response_reads_nested_and_list_errors() {
        let nested = ApiError::from_response(422, r#"{"error":{"message":"bad email"}}"#);
        assert_eq!(nested.server_message(), Some("bad email"));

        let flat = ApiError::from_response(422, r#"{"error":"expired"}"#);
        assert_eq!(flat.server_message(), Some("expired"));

        let list = ApiError::from_response(500, r#"{"errors":["boom"]}"#);
        assert_eq!(list.server_message(), Some("boom"));
    }

    #[test]
    fn from_response_falls_back_to_status_message() {
        let err = ApiError::from_response(503, r#"{"success":false}"#);
        assert_eq!(err.server_message(), None);
        assert_eq!(err.body(), Some(r#"{"success":false}"#));
        assert_eq!(err.user_message(), "Request failed with status 503");

        let empty = ApiError::from_response(502, "   ");
        assert_eq!(empty.body(), None);
        assert_eq!(empty.user_message(), "Request failed with status 502");
    }

    #[test]
    fn plain_text_bodies_are_truncated() {
        let long = "x".repeat(500);
        let err = ApiError::from_response(500, &long);
        assert_eq!(err.server_message().map(str::len), Some(MAX_ERROR_CHARS));
    }

    #[test]
    fn network_errors_have_generic_message() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert!(err.user_message().contains("Unable to reach the server"));
        assert!(!ApiError::MissingSession.is_unauthorized());
        assert!(ApiError::from_response(401, "").is_unauthorized());
    }
}

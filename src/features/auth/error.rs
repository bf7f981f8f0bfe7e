use crate::{api::ApiError, features::auth::guards::Route, storage::StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected before any network call.
    #[error("{0}")]
    Validation(String),
    /// No staged email: the OTP step was reached without a login request.
    #[error("no login in progress")]
    MissingLoginEmail,
    #[error("already signed in")]
    AlreadyAuthenticated,
    /// The same action is already waiting on the server.
    #[error("a request is already in flight")]
    InFlight,
    /// A newer login request was issued before this one settled.
    #[error("superseded by a newer login request")]
    Superseded,
    #[error("login request failed: {0}")]
    Login(#[source] ApiError),
    #[error("verification failed: {0}")]
    Verification(#[source] ApiError),
    #[error("invalid verification response")]
    InvalidResponse,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Text for a transient user notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::MissingLoginEmail => "Your login session expired. Please enter your email again."
                .to_string(),
            Self::AlreadyAuthenticated => "You are already signed in.".to_string(),
            Self::InFlight => "Please wait for the current request to finish.".to_string(),
            Self::Superseded => "A newer login request replaced this one.".to_string(),
            Self::Login(err) => format!("Failed to send verification code: {}", err.user_message()),
            Self::Verification(err) => match err {
                ApiError::Network(_) | ApiError::Timeout(_) => err.user_message(),
                _ => err
                    .server_message()
                    .map_or_else(|| "Verification failed".to_string(), ToString::to_string),
            },
            Self::InvalidResponse => "Verification failed".to_string(),
            Self::Storage(_) => "Unable to save your session locally.".to_string(),
        }
    }

    /// Screen the caller should route to, when the error is a routing failure.
    #[must_use]
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::MissingLoginEmail => Some(Route::Login),
            Self::AlreadyAuthenticated => Some(Route::Dashboard),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_message_is_verbatim_when_server_sends_one() {
        let err = AuthError::Verification(ApiError::from_response(400, r#"{"message":"Invalid OTP"}"#));
        assert_eq!(err.user_message(), "Invalid OTP");

        let err = AuthError::Verification(ApiError::from_response(500, ""));
        assert_eq!(err.user_message(), "Verification failed");

        let err = AuthError::Verification(ApiError::Network("refused".to_string()));
        assert!(err.user_message().contains("Unable to reach the server"));
    }

    #[test]
    fn login_failures_are_reported_generically() {
        let err = AuthError::Login(ApiError::from_response(404, r#"{"message":"Manager not found"}"#));
        assert_eq!(
            err.user_message(),
            "Failed to send verification code: Manager not found"
        );
        assert_eq!(err.redirect(), None);
    }

    #[test]
    fn missing_login_email_redirects_to_login() {
        assert_eq!(AuthError::MissingLoginEmail.redirect(), Some(Route::Login));
    }
}

use crate::storage::Session;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Length of the emailed one-time code.
pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
}

/// Never log this type: it carries the one-time code.
#[derive(Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

#[derive(Deserialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub manager: ManagerIdentity,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerIdentity {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub ref_code: String,
}

impl VerifyOtpResponse {
    /// Turns the verification payload into a persistable session.
    /// Returns `None` when the server handed back an unusable token or id.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        if self.token.trim().is_empty() || self.manager.id.trim().is_empty() {
            return None;
        }
        Some(Session {
            token: self.token,
            manager_id: self.manager.id,
            manager_name: self.manager.name,
            manager_email: self.manager.email,
            ref_code: self.manager.ref_code,
        })
    }
}

/// Where the login protocol currently stands, derived from persisted state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    OtpPending { email: String },
    Authenticated(Session),
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Trims and checks an email address. Returns the normalized value.
///
/// # Errors
/// Returns a user-facing message when the address is empty or malformed.
pub fn validate_email(email: &str) -> Result<String, String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Please enter your email address".to_string());
    }
    if !valid_email(email) {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(email.to_string())
}

/// Accepts exactly six ASCII digits, surrounding whitespace ignored.
///
/// # Errors
/// Returns a user-facing message for anything else.
pub fn validate_otp(code: &str) -> Result<String, String> {
    let code = code.trim();
    if code.len() != OTP_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Enter the {OTP_LENGTH}-digit verification code"));
    }
    Ok(code.to_string())
}

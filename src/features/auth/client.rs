//! Wrappers for the two unauthenticated login endpoints. Neither call sends an
//! `authorization` header, and neither may log the one-time code.

use crate::{
    api::{ApiClient, ApiError, Auth},
    features::auth::types::{LoginRequest, VerifyOtpRequest, VerifyOtpResponse},
};
use serde::de::IgnoredAny;

pub const LOGIN_PATH: &str = "/utm/manager/login";
pub const VERIFY_OTP_PATH: &str = "/utm/manager/verify-otp";

/// Asks the backend to email a one-time code. The response body is ignored.
///
/// # Errors
/// Returns the API error when the server rejects the email or can not be reached.
pub async fn request_otp(api: &ApiClient, email: &str) -> Result<(), ApiError> {
    let _: IgnoredAny = api
        .post_json(LOGIN_PATH, &LoginRequest { email }, Auth::Anonymous)
        .await?;
    Ok(())
}

/// Exchanges the staged email and the code for a token and manager identity.
///
/// # Errors
/// Returns the API error for wrong or expired codes and transport failures.
pub async fn verify_otp(
    api: &ApiClient,
    email: &str,
    otp: &str,
) -> Result<VerifyOtpResponse, ApiError> {
    api.post_json(
        VERIFY_OTP_PATH,
        &VerifyOtpRequest { email, otp },
        Auth::Anonymous,
    )
    .await
}

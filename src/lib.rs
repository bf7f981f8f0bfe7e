//! # Refdash (Referral Manager Dashboard Client)
//!
//! `refdash` is the client side of the UTM manager dashboard: an affiliate logs in
//! with their email and a one-time code, then browses KPI summaries, sales
//! analytics, referral transactions and withdrawals served by the backend REST API.
//!
//! ## Session Lifecycle
//!
//! 1. **Request:** `POST /utm/manager/login` with `{email}`. On success the email is
//!    staged in local storage so OTP entry survives a restart.
//! 2. **Verify:** `POST /utm/manager/verify-otp` with `{email, otp}`. The returned token
//!    and manager identity are persisted as one `Session` record and the staged
//!    email is cleared.
//! 3. **Use:** protected endpoints read the token from storage at call time and send
//!    it in the `authorization` header.
//! 4. **Logout:** purely local; the session record is deleted.
//!
//! ## Screens
//!
//! Dashboard, Transactions and Withdrawals are independent controllers. Each keeps
//! `loading`/`error`/`data`, never blanks data on failure and discards responses
//! that were overtaken by a newer request.

pub mod api;
pub mod cli;
pub mod config;
pub mod features;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

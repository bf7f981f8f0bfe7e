pub mod auth;
pub mod dashboard;
pub mod transactions;
pub mod withdrawals;

// Interpreter for `Action`.
mod run;

use crate::{
    api::ApiClient,
    features::{
        auth::{guards, Route},
        export::write_export,
    },
    storage::Session,
};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Action {
    Login(auth::LoginArgs),
    Verify(auth::VerifyArgs),
    Resend(auth::Args),
    Logout(auth::Args),
    Status(auth::Args),
    Dashboard(dashboard::Args),
    Transactions(transactions::Args),
    Withdrawals(withdrawals::Args),
    Withdraw(withdrawals::RequestArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

/// Error for a screen that needs a session, pointing the user at `route`.
#[must_use]
pub fn redirect_error(route: Route) -> anyhow::Error {
    let hint = match route {
        Route::Login => "not signed in, run `refdash login <email>` first",
        Route::Otp => "login pending, run `refdash verify <code>`",
        Route::Dashboard => "already signed in",
    };
    anyhow!("{hint} (redirect to {})", route.path())
}

/// Session gate shared by the protected commands. No request is made without one.
///
/// # Errors
/// Returns the redirect error when nobody is signed in.
pub fn require_session(api: &ApiClient) -> anyhow::Result<Session> {
    guards::require_session(api.store()).map_err(redirect_error)
}

/// Writes a CSV export. A directory target gets `file_name` appended.
///
/// # Errors
/// Returns an error if the file can not be written.
pub fn write_csv(target: &Path, file_name: &str, csv: &str) -> anyhow::Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(file_name)
    } else {
        target.to_path_buf()
    };
    write_export(&path, csv)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "utm-transactions-2024-07-26.csv", "a,b").unwrap();
        assert_eq!(path, dir.path().join("utm-transactions-2024-07-26.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b");

        let file = dir.path().join("nested/out.csv");
        assert_eq!(write_csv(&file, "ignored.csv", "x").unwrap(), file);
    }

    #[test]
    fn test_redirect_error_names_route() {
        assert!(redirect_error(Route::Login).to_string().contains("/login"));
        assert!(redirect_error(Route::Otp).to_string().contains("/otp"));
    }
}

use crate::cli::{
    actions::{auth, dashboard, transactions, withdrawals, Action},
    telemetry,
};
use anyhow::Result;

/// Execute the provided action, then flush traces.
///
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Login(args) => auth::login(args).await,
        Action::Verify(args) => auth::verify(args).await,
        Action::Resend(args) => auth::resend(args).await,
        Action::Logout(args) => auth::logout(&args),
        Action::Status(args) => auth::status(&args),
        Action::Dashboard(args) => dashboard::execute(args).await,
        Action::Transactions(args) => transactions::execute(args).await,
        Action::Withdrawals(args) => withdrawals::execute(args).await,
        Action::Withdraw(args) => withdrawals::request(args).await,
    };

    telemetry::shutdown_tracer();
    result
}

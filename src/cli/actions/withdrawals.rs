use crate::{
    cli::{
        actions::{redirect_error, require_session, write_csv},
        globals::GlobalArgs,
    },
    features::{
        auth::Route,
        dashboard::client::fetch_profile,
        format::format_amount,
        withdrawals::{
            export::withdrawals_file_name, LogWithdrawalGateway, WithdrawalError, WithdrawalForm,
            WithdrawalGateway, WithdrawalQuery, WithdrawalRequest, WithdrawalStatusFilter,
            WithdrawalsController,
        },
    },
};
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Args {
    pub globals: GlobalArgs,
    pub page: u32,
    pub limit: u32,
    pub filter: String,
    pub status: WithdrawalStatusFilter,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub export: Option<PathBuf>,
}

impl Args {
    /// Filters reset the page, so the page is applied last.
    ///
    /// # Errors
    /// Returns an error for an inverted date range.
    pub fn query(&self) -> Result<WithdrawalQuery> {
        let mut query = WithdrawalQuery::default();
        query.set_limit(self.limit);
        query.set_filter(&self.filter);
        query.set_status(self.status);
        query
            .set_date_range(self.from, self.to)
            .map_err(|e| anyhow!(e))?;
        query.set_page(self.page);
        Ok(query)
    }
}

#[derive(Debug, Clone)]
pub struct RequestArgs {
    pub globals: GlobalArgs,
    pub amount: String,
    pub wallet_address: String,
    pub note: String,
    /// Falls back to the profile's total earnings.
    pub balance: Option<f64>,
    pub accept_terms: bool,
}

/// # Errors
/// Returns an error when nobody is signed in, the request fails with nothing
/// to show, or the export can not be written.
pub async fn execute(args: Args) -> Result<()> {
    let query = args.query()?;
    let (_, api) = args.globals.client()?;
    require_session(&api)?;

    let withdrawals = WithdrawalsController::with_query(api, query);
    withdrawals.load().await.map_err(redirect_error)?;

    let state = withdrawals.state();
    let Some(page) = state.data else {
        return Err(anyhow!(state
            .error
            .unwrap_or_else(|| "Failed to fetch withdrawals".to_string())));
    };

    let summary = withdrawals.summary();
    println!("Total withdrawn: ${}", format_amount(summary.total_withdrawn));
    println!("Pending:         ${}", format_amount(summary.pending_amount));
    println!();

    if page.items.is_empty() {
        println!("No withdrawals found");
    }
    for row in &page.items {
        println!(
            "{:<12} {:<25} {:<44} ${:>10} -> ${:>10}  {}",
            row.withdrawal_id,
            row.withdrawal_date,
            row.wallet_address,
            format_amount(row.amount),
            format_amount(row.final_amount.unwrap_or(row.amount)),
            row.status
        );
    }
    if let Some(pagination) = withdrawals.pagination() {
        println!("{}", pagination.summary("withdrawals"));
    }

    if let Some(target) = &args.export {
        let csv = withdrawals.export_csv().unwrap_or_default();
        let path = write_csv(target, &withdrawals_file_name(Local::now().date_naive()), &csv)?;
        info!(path = %path.display(), rows = page.items.len(), "exported withdrawals");
        println!("Exported {} rows to {}", page.items.len(), path.display());
    }

    Ok(())
}

/// Validates a withdrawal and hands it to the log gateway. Nothing is sent to
/// the backend, which has no submission endpoint.
///
/// # Errors
/// Returns an error when nobody is signed in, the balance can not be fetched,
/// or the form is invalid.
pub async fn request(args: RequestArgs) -> Result<()> {
    let report = request_with(args, &LogWithdrawalGateway).await?;
    println!("{report}");
    Ok(())
}

/// Validates the form, passes the draft to `gateway` and describes the result.
///
/// # Errors
/// Same as [`request`], plus any gateway failure.
pub async fn request_with(args: RequestArgs, gateway: &dyn WithdrawalGateway) -> Result<String> {
    let (_, api) = args.globals.client()?;
    let session = require_session(&api)?;

    let balance = match args.balance {
        Some(balance) => balance,
        None => {
            let profile = fetch_profile(&api, &session.manager_id)
                .await
                .map_err(|err| anyhow!(err.user_message()))
                .context("could not determine the available balance, pass --balance")?;
            debug!(usd_stake = ?profile.usd_stake, "available balance from profile");
            profile.usd_stake.unwrap_or(0.0)
        }
    };

    let form = WithdrawalForm {
        amount: args.amount,
        wallet_address: args.wallet_address,
        note: args.note,
        accepted_terms: args.accept_terms,
    };
    let request = WithdrawalsController::new(api)
        .request_withdrawal(&form, balance, gateway)
        .map_err(|err| match err {
            WithdrawalError::NotSignedIn => redirect_error(Route::Login),
            other => anyhow!(other.user_message()),
        })?;

    Ok(draft_report(&request))
}

fn draft_report(request: &WithdrawalRequest) -> String {
    [
        "Withdrawal draft is valid (not submitted)".to_string(),
        format!("Amount:         ${}", format_amount(request.amount)),
        format!("Processing fee: ${}", format_amount(request.processing_fee)),
        format!("You receive:    ${}", format_amount(request.final_amount)),
        format!("Wallet:         {}", request.wallet_address),
        format!("Note:           {}", request.note),
    ]
    .join("\n")
}

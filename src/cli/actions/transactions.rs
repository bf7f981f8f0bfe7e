use crate::{
    cli::{
        actions::{redirect_error, require_session, write_csv},
        globals::GlobalArgs,
    },
    features::{
        format::{format_amount, trim_number},
        pagination::Pagination,
        transactions::{
            export::transactions_file_name, StatusFilter, Transaction, TransactionQuery,
            TransactionsController,
        },
    },
};
use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Args {
    pub globals: GlobalArgs,
    pub page: u32,
    pub page_size: u32,
    pub filter: String,
    pub status: StatusFilter,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub export: Option<PathBuf>,
}

impl Args {
    /// Applies the filters first: each one resets the page, so the page goes last.
    ///
    /// # Errors
    /// Returns an error for an unsupported page size or an inverted date range.
    pub fn query(&self) -> Result<TransactionQuery> {
        let mut query = TransactionQuery::default();
        query.set_page_size(self.page_size).map_err(|e| anyhow!(e))?;
        query.set_filter(&self.filter);
        query.set_status(self.status);
        query
            .set_date_range(self.from, self.to)
            .map_err(|e| anyhow!(e))?;
        query.set_page(self.page);
        Ok(query)
    }
}

fn print_row(serial: u64, tx: &Transaction) {
    let amount = |value: Option<f64>| value.map_or_else(|| "-".to_string(), format_amount);
    println!(
        "{serial:>4}  {:<25} {:<12} {:<44} ${:>12} {:>14} HABE  earn ${:>10}  ref {:>12}  {:>5}",
        tx.created_at,
        tx.status,
        tx.wallet_address,
        amount(tx.usd_stake),
        amount(tx.tokens),
        amount(tx.manager_earnings()),
        amount(tx.referral_tokens()),
        tx.commission_percent()
            .map_or_else(|| "-".to_string(), |percent| format!("{}%", trim_number(percent))),
    );
}

fn print_pagination(pagination: &Pagination) {
    println!("{}", pagination.summary("transactions"));
    if pagination.total_pages() > 1 {
        let pages = pagination
            .window()
            .iter()
            .map(|page| {
                if *page == pagination.current_page() {
                    format!("[{page}]")
                } else {
                    page.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("Pages: {pages} of {}", pagination.total_pages());
    }
}

/// # Errors
/// Returns an error when nobody is signed in, the request fails with nothing
/// to show, or the export can not be written.
pub async fn execute(args: Args) -> Result<()> {
    let query = args.query()?;
    let (_, api) = args.globals.client()?;
    require_session(&api)?;

    let transactions = TransactionsController::with_query(api, query);
    transactions.load().await.map_err(redirect_error)?;

    let state = transactions.state();
    let Some(page) = state.data else {
        return Err(anyhow!(state
            .error
            .unwrap_or_else(|| "Failed to fetch transactions".to_string())));
    };

    if page.items.is_empty() {
        println!("No transactions found");
    } else {
        let offset = transactions
            .pagination()
            .and_then(|pagination| pagination.range())
            .map_or(1, |(first, _)| first);
        for (index, tx) in (offset..).zip(&page.items) {
            print_row(index, tx);
        }
    }
    if let Some(pagination) = transactions.pagination() {
        print_pagination(&pagination);
    }

    if let Some(target) = &args.export {
        let csv = transactions.export_csv().unwrap_or_default();
        let path = write_csv(
            target,
            &transactions_file_name(Local::now().date_naive()),
            &csv,
        )?;
        info!(path = %path.display(), rows = page.items.len(), "exported transactions");
        println!("Exported {} rows to {}", page.items.len(), path.display());
    }

    Ok(())
}

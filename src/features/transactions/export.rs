use crate::features::{
    export::{csv_document, export_file_name, optional_number},
    transactions::types::Transaction,
};
use chrono::NaiveDate;

pub const CSV_HEADER: [&str; 10] = [
    "Sr. No",
    "Date",
    "Transaction Hash",
    "User Wallet",
    "Purchase Amount",
    "HABE Tokens",
    "Manager Earnings",
    "Referral Tokens",
    "Commission %",
    "Status",
];

/// Renders the loaded page as CSV. Serial numbers restart at 1 for each page.
#[must_use]
pub fn transactions_csv(items: &[Transaction]) -> String {
    let rows = items.iter().enumerate().map(|(index, tx)| {
        vec![
            (index + 1).to_string(),
            tx.created_at.clone(),
            tx.transaction_hash.clone(),
            tx.wallet_address.clone(),
            optional_number(tx.usd_stake),
            optional_number(tx.tokens),
            optional_number(tx.manager_earnings()),
            optional_number(tx.referral_tokens()),
            optional_number(tx.commission_percent()),
            tx.status.clone(),
        ]
    });
    csv_document(&CSV_HEADER, rows)
}

#[must_use]
pub fn transactions_file_name(date: NaiveDate) -> String {
    export_file_name("utm-transactions", date)
}

use crate::features::{
    export::{csv_document, export_file_name, optional_number},
    withdrawals::types::Withdrawal,
};
use chrono::NaiveDate;

pub const CSV_HEADER: [&str; 11] = [
    "Withdrawal ID",
    "Date",
    "Wallet Address",
    "Amount",
    "Processing Fee",
    "Final Amount",
    "Status",
    "Transaction Hash",
    "Processing Date",
    "Remark",
    "Admin Remarks",
];

#[must_use]
pub fn withdrawals_csv(items: &[Withdrawal]) -> String {
    let rows = items.iter().map(|row| {
        vec![
            row.withdrawal_id.clone(),
            row.withdrawal_date.clone(),
            row.wallet_address.clone(),
            row.amount.to_string(),
            optional_number(row.processing_fee),
            optional_number(row.final_amount),
            row.status.to_string(),
            row.transaction_hash.clone().unwrap_or_default(),
            row.processing_date.clone().unwrap_or_default(),
            row.remark.clone().unwrap_or_default(),
            row.admin_remarks.clone().unwrap_or_default(),
        ]
    });
    csv_document(&CSV_HEADER, rows)
}

#[must_use]
pub fn withdrawals_file_name(date: NaiveDate) -> String {
    export_file_name("utm-withdrawals", date)
}

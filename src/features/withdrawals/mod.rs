//! Withdrawals screen: filtered and paginated history, summary totals, CSV
//! export and the withdrawal request form.

pub mod client;
pub mod export;
pub mod query;
pub mod request;
pub mod state;
pub mod types;

pub use query::{WithdrawalQuery, WithdrawalStatusFilter};
pub use request::{
    LogWithdrawalGateway, WithdrawalForm, WithdrawalGateway, WithdrawalRequest,
    WithdrawalValidationError,
};
pub use state::{WithdrawalError, WithdrawalsController};
pub use types::{Withdrawal, WithdrawalPage, WithdrawalStatus, WithdrawalSummary};

//! Transactions screen: server-side filtering and pagination over the manager's
//! referred purchases, plus CSV export of the loaded page.

pub mod client;
pub mod export;
pub mod state;
pub mod types;

pub use state::TransactionsController;
pub use types::{StatusFilter, Transaction, TransactionPage, TransactionQuery};

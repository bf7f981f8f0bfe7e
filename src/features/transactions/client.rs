use crate::{
    api::{ApiClient, ApiError, Auth},
    features::transactions::types::{TransactionPage, TransactionQuery},
};

pub const TRANSACTIONS_PATH: &str = "/transactions/getAll";

/// Fetches one page of the manager's referred transactions.
///
/// # Errors
/// Returns `ApiError::MissingSession` without a network call when nobody is
/// signed in, otherwise the transport or server error.
pub async fn fetch_transactions(
    api: &ApiClient,
    manager_id: &str,
    query: &TransactionQuery,
) -> Result<TransactionPage, ApiError> {
    api.get_json(TRANSACTIONS_PATH, &query.to_params(manager_id), Auth::Session)
        .await
}

use crate::{
    api::{ApiClient, ApiError, Auth},
    features::withdrawals::{query::WithdrawalQuery, types::WithdrawalPage},
};

/// Fetches one filtered page of the manager's withdrawals.
///
/// # Errors
/// Returns `ApiError::MissingSession` without a network call when nobody is
/// signed in, otherwise the transport or server error.
pub async fn fetch_withdrawals(
    api: &ApiClient,
    manager_id: &str,
    query: &WithdrawalQuery,
) -> Result<WithdrawalPage, ApiError> {
    api.get_json(
        &format!("/utm/managers/{manager_id}/withdrawals"),
        &query.to_params(),
        Auth::Session,
    )
    .await
}

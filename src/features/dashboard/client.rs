use crate::{
    api::{ApiClient, ApiError, Auth},
    features::dashboard::types::{ManagerProfile, SalesAnalytics, SalesPeriod, SalesPoint},
};

fn manager_path(manager_id: &str) -> String {
    format!("/utm/managers/{manager_id}")
}

/// The profile endpoint is public; no token is sent.
///
/// # Errors
/// Returns the transport or server error.
pub async fn fetch_profile(api: &ApiClient, manager_id: &str) -> Result<ManagerProfile, ApiError> {
    api.get_json(&manager_path(manager_id), &[], Auth::Anonymous)
        .await
}

/// Sales buckets for `period`, labelled for the chart axis.
///
/// # Errors
/// Returns the transport or server error.
pub async fn fetch_sales(
    api: &ApiClient,
    manager_id: &str,
    period: SalesPeriod,
) -> Result<Vec<SalesPoint>, ApiError> {
    let path = format!("{}/sales-analytics", manager_path(manager_id));
    let analytics: Option<SalesAnalytics> = api
        .get_json(&path, &[("period", period.as_str().to_string())], Auth::Anonymous)
        .await?;
    Ok(analytics
        .map(|analytics| analytics.sales_data)
        .unwrap_or_default()
        .into_iter()
        .map(|bucket| SalesPoint::from_bucket(period, bucket))
        .collect())
}

use crate::{
    api::ApiClient,
    features::{
        auth::{guards, Route},
        pagination::Pagination,
        screen::{Screen, ScreenState, Settled},
        withdrawals::{
            client,
            export::withdrawals_csv,
            query::{WithdrawalQuery, WithdrawalStatusFilter},
            request::{WithdrawalForm, WithdrawalGateway, WithdrawalRequest, WithdrawalValidationError},
            types::{WithdrawalPage, WithdrawalSummary},
        },
    },
};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum WithdrawalError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("invalid withdrawal request")]
    Invalid(Vec<WithdrawalValidationError>),
    #[error("withdrawal submission failed: {0}")]
    Submission(#[source] anyhow::Error),
}

impl WithdrawalError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotSignedIn => "Please log in to request a withdrawal.".to_string(),
            Self::Invalid(errors) => errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            Self::Submission(_) => {
                "Failed to submit withdrawal request. Please try again.".to_string()
            }
        }
    }
}

#[derive(Clone)]
pub struct WithdrawalsController {
    api: ApiClient,
    query: Arc<RwLock<WithdrawalQuery>>,
    screen: Screen<WithdrawalPage>,
}

impl WithdrawalsController {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::with_query(api, WithdrawalQuery::default())
    }

    #[must_use]
    pub fn with_query(api: ApiClient, query: WithdrawalQuery) -> Self {
        Self {
            api,
            query: Arc::new(RwLock::new(query)),
            screen: Screen::new("withdrawals"),
        }
    }

    #[must_use]
    pub fn query(&self) -> WithdrawalQuery {
        self.read_query().clone()
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.read_query().page()
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.read_query().limit()
    }

    pub fn go_to_page(&self, page: u32) {
        self.write_query().set_page(page);
    }

    /// Changing the page size returns to the first page.
    pub fn set_limit(&self, limit: u32) {
        self.write_query().set_limit(limit);
    }

    pub fn set_filter(&self, filter: &str) {
        self.write_query().set_filter(filter);
    }

    pub fn set_status(&self, status: WithdrawalStatusFilter) {
        self.write_query().set_status(status);
    }

    /// # Errors
    /// Returns a message when `from` is after `to`.
    pub fn set_date_range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), String> {
        self.write_query().set_date_range(from, to)
    }

    #[must_use]
    pub fn state(&self) -> ScreenState<WithdrawalPage> {
        self.screen.snapshot()
    }

    /// # Errors
    /// Returns the route to send the user to when there is no session.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Settled, Route> {
        let Ok(session) = guards::require_session(self.api.store()) else {
            self.screen.fail("Please log in to view withdrawals.");
            return Err(Route::Login);
        };

        let (query, ticket) = {
            let query = self.read_query();
            (query.clone(), self.screen.begin())
        };
        let result = client::fetch_withdrawals(&self.api, &session.manager_id, &query).await;
        Ok(self.screen.settle(ticket, result))
    }

    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        let total = self.screen.data()?.total_items;
        let query = self.read_query();
        Some(Pagination::new(query.page(), query.limit(), total))
    }

    /// Totals over the loaded rows; zeroes before the first load.
    #[must_use]
    pub fn summary(&self) -> WithdrawalSummary {
        self.screen
            .data()
            .map(|page| WithdrawalSummary::from_rows(&page.items))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn export_csv(&self) -> Option<String> {
        self.screen.data().map(|page| withdrawals_csv(&page.items))
    }

    /// Validates the form and hands the request to `gateway`.
    ///
    /// # Errors
    /// `NotSignedIn` without a session, `Invalid` with every failing field, or
    /// `Submission` when the gateway rejects the request.
    pub fn request_withdrawal(
        &self,
        form: &WithdrawalForm,
        available_balance: f64,
        gateway: &dyn WithdrawalGateway,
    ) -> Result<WithdrawalRequest, WithdrawalError> {
        if !self.api.store().is_authenticated() {
            return Err(WithdrawalError::NotSignedIn);
        }
        let request = form
            .validate(available_balance)
            .map_err(WithdrawalError::Invalid)?;
        gateway.submit(&request).map_err(|err| {
            warn!(error = %err, "withdrawal submission failed");
            WithdrawalError::Submission(err)
        })?;
        info!(amount = request.amount, "withdrawal requested");
        Ok(request)
    }

    fn read_query(&self) -> RwLockReadGuard<'_, WithdrawalQuery> {
        self.query
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_query(&self) -> RwLockWriteGuard<'_, WithdrawalQuery> {
        self.query
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        features::withdrawals::{request::LogWithdrawalGateway, types::WithdrawalStatus},
        storage::{MemoryStorage, Session, SessionStore},
    };
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WALLET: &str = "0xdd33d6b7C9E13D9f86C8e32Ff5b69c7f7742b794";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn controller(uri: &str, signed_in: bool) -> WithdrawalsController {
        let config = AppConfig::new(uri, "/tmp/refdash-tests").unwrap();
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        if signed_in {
            store
                .save_session(&Session {
                    token: "tok1".to_string(),
                    manager_id: "m1".to_string(),
                    manager_name: "A".to_string(),
                    manager_email: "a@x.com".to_string(),
                    ref_code: "R1".to_string(),
                })
                .unwrap();
        }
        WithdrawalsController::new(ApiClient::new(&config, store).unwrap())
    }

    struct FailingGateway;

    impl WithdrawalGateway for FailingGateway {
        fn submit(&self, _request: &WithdrawalRequest) -> anyhow::Result<()> {
            anyhow::bail!("gateway offline")
        }
    }

    fn form(amount: &str) -> WithdrawalForm {
        WithdrawalForm {
            amount: amount.to_string(),
            wallet_address: WALLET.to_string(),
            note: String::new(),
            accepted_terms: true,
        }
    }

    #[tokio::test]
    async fn loads_page_and_computes_summary() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/utm/managers/m1/withdrawals"))
            .and(header("authorization", "tok1"))
            .and(query_param("page", "1"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "withdrawals": [
                        {"id": 1, "withdrawalId": "WD-1", "amount": 20, "finalAmount": 19, "status": "completed"},
                        {"id": 2, "withdrawalId": "WD-2", "amount": 150, "status": "pending"}
                    ],
                    "total": 2
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let withdrawals = controller(&server.uri(), true);
        assert_eq!(withdrawals.load().await, Ok(Settled::Applied));

        let summary = withdrawals.summary();
        assert!((summary.total_withdrawn - 19.0).abs() < f64::EPSILON);
        assert!((summary.pending_amount - 150.0).abs() < f64::EPSILON);
        assert_eq!(withdrawals.pagination().unwrap().total_pages(), 1);
        assert_eq!(withdrawals.export_csv().unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn without_session_redirects_and_makes_no_request() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        let withdrawals = controller(&server.uri(), false);
        assert_eq!(withdrawals.load().await, Err(Route::Login));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_reach_the_query_string_from_page_one() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/utm/managers/m1/withdrawals"))
            .and(query_param("page", "1"))
            .and(query_param("limit", "25"))
            .and(query_param("filter", "WD-7"))
            .and(query_param("status", "pending"))
            .and(query_param("fromDate", "2024-07-01"))
            .and(query_param("toDate", "2024-07-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "withdrawals": [
                        {"id": 7, "withdrawalId": "WD-7", "amount": 40, "status": "pending"}
                    ],
                    "total": 1
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let withdrawals = controller(&server.uri(), true);
        withdrawals.go_to_page(3);
        withdrawals.set_filter(" WD-7 ");
        assert_eq!(withdrawals.page(), 1);

        withdrawals.go_to_page(3);
        withdrawals.set_status(WithdrawalStatusFilter::Only(WithdrawalStatus::Pending));
        assert_eq!(withdrawals.page(), 1);

        withdrawals.go_to_page(3);
        withdrawals
            .set_date_range(
                NaiveDate::from_ymd_opt(2024, 7, 1),
                NaiveDate::from_ymd_opt(2024, 7, 31),
            )
            .unwrap();
        assert_eq!(withdrawals.page(), 1);

        assert_eq!(withdrawals.load().await, Ok(Settled::Applied));
        assert!((withdrawals.summary().pending_amount - 40.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn all_statuses_send_an_empty_status() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/utm/managers/m1/withdrawals"))
            .and(query_param("page", "2"))
            .and(query_param("status", ""))
            .and(query_param("filter", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"withdrawals": [], "total": 30}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let withdrawals = controller(&server.uri(), true);
        withdrawals.go_to_page(2);
        assert_eq!(withdrawals.load().await, Ok(Settled::Applied));
        assert_eq!(withdrawals.pagination().unwrap().current_page(), 2);
    }

    #[test]
    fn inverted_range_leaves_query_untouched() {
        let withdrawals = controller("http://127.0.0.1:9", true);
        withdrawals.go_to_page(2);
        assert!(withdrawals
            .set_date_range(
                NaiveDate::from_ymd_opt(2024, 8, 1),
                NaiveDate::from_ymd_opt(2024, 7, 1),
            )
            .is_err());
        assert_eq!(withdrawals.query().page(), 2);
        assert_eq!(withdrawals.query().date_range(), (None, None));
    }

    #[test]
    fn limit_change_resets_page() {
        let withdrawals = controller("http://127.0.0.1:9", true);
        withdrawals.go_to_page(4);
        withdrawals.set_limit(25);
        assert_eq!(withdrawals.page(), 4);
        withdrawals.set_limit(50);
        assert_eq!(withdrawals.page(), 1);
        assert_eq!(withdrawals.limit(), 50);
    }

    #[test]
    fn request_is_validated_then_submitted() {
        let withdrawals = controller("http://127.0.0.1:9", true);
        let request = withdrawals
            .request_withdrawal(&form("100"), 1250.5, &LogWithdrawalGateway)
            .unwrap();
        assert!((request.final_amount - 99.0).abs() < f64::EPSILON);

        let err = withdrawals
            .request_withdrawal(&form("5"), 1250.5, &LogWithdrawalGateway)
            .unwrap_err();
        assert_eq!(err.user_message(), "Minimum withdrawal amount is $10");

        let err = withdrawals
            .request_withdrawal(&form("100"), 1250.5, &FailingGateway)
            .unwrap_err();
        assert!(matches!(err, WithdrawalError::Submission(_)));
    }

    #[test]
    fn request_requires_session() {
        let withdrawals = controller("http://127.0.0.1:9", false);
        let err = withdrawals
            .request_withdrawal(&form("100"), 1250.5, &LogWithdrawalGateway)
            .unwrap_err();
        assert!(matches!(err, WithdrawalError::NotSignedIn));
    }
}

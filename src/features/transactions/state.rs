use crate::{
    api::ApiClient,
    features::{
        auth::{guards, Route},
        pagination::Pagination,
        screen::{Screen, ScreenState, Settled},
        transactions::{
            client,
            export::transactions_csv,
            types::{StatusFilter, TransactionPage, TransactionQuery},
        },
    },
};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::instrument;

/// Holds the current query and the last loaded page. Setters only change the
/// query; call [`TransactionsController::load`] afterwards to fetch it.
#[derive(Clone)]
pub struct TransactionsController {
    api: ApiClient,
    query: Arc<RwLock<TransactionQuery>>,
    screen: Screen<TransactionPage>,
}

impl TransactionsController {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::with_query(api, TransactionQuery::default())
    }

    #[must_use]
    pub fn with_query(api: ApiClient, query: TransactionQuery) -> Self {
        Self {
            api,
            query: Arc::new(RwLock::new(query)),
            screen: Screen::new("transactions"),
        }
    }

    #[must_use]
    pub fn query(&self) -> TransactionQuery {
        self.read_query().clone()
    }

    #[must_use]
    pub fn state(&self) -> ScreenState<TransactionPage> {
        self.screen.snapshot()
    }

    /// Fetches the page described by the current query.
    ///
    /// # Errors
    /// Returns the route to send the user to when there is no session; no
    /// request is made in that case.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Settled, Route> {
        let Ok(session) = guards::require_session(self.api.store()) else {
            self.screen.fail("Please log in to view transactions.");
            return Err(Route::Login);
        };

        // Query and ticket are taken together so the ticket always matches
        // the parameters it fetched.
        let (query, ticket) = {
            let query = self.read_query();
            (query.clone(), self.screen.begin())
        };
        let result = client::fetch_transactions(&self.api, &session.manager_id, &query).await;
        Ok(self.screen.settle(ticket, result))
    }

    pub fn set_filter(&self, filter: &str) {
        self.write_query().set_filter(filter);
    }

    pub fn set_status(&self, status: StatusFilter) {
        self.write_query().set_status(status);
    }

    /// # Errors
    /// Returns a message when `from` is after `to`.
    pub fn set_date_range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), String> {
        self.write_query().set_date_range(from, to)
    }

    /// # Errors
    /// Returns a message for sizes the table does not offer.
    pub fn set_page_size(&self, size: u32) -> Result<(), String> {
        self.write_query().set_page_size(size)
    }

    pub fn go_to_page(&self, page: u32) {
        self.write_query().set_page(page);
    }

    /// Moves forward one page. Returns false on the last page.
    pub fn next_page(&self) -> bool {
        if !self.pagination().is_some_and(|page| page.has_next()) {
            return false;
        }
        let mut query = self.write_query();
        let next = query.page() + 1;
        query.set_page(next);
        true
    }

    /// Moves back one page. Returns false on the first page.
    pub fn previous_page(&self) -> bool {
        let mut query = self.write_query();
        if query.page() <= 1 {
            return false;
        }
        let previous = query.page() - 1;
        query.set_page(previous);
        true
    }

    /// Page math for the loaded data, `None` before the first successful load.
    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        let total = self.screen.data()?.total_items;
        let query = self.read_query();
        Some(Pagination::new(query.page(), query.page_size(), total))
    }

    /// CSV of the loaded page, `None` when nothing is loaded.
    #[must_use]
    pub fn export_csv(&self) -> Option<String> {
        self.screen.data().map(|page| transactions_csv(&page.items))
    }

    fn read_query(&self) -> RwLockReadGuard<'_, TransactionQuery> {
        self.query
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_query(&self) -> RwLockWriteGuard<'_, TransactionQuery> {
        self.query
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

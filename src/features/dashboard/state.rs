use crate::{
    api::ApiClient,
    features::{
        auth::{guards, Route},
        dashboard::{
            client,
            types::{
                kpis, referral_url, Kpi, ManagerProfile, SalesPeriod, SalesPoint,
                RECENT_TRANSACTIONS_LIMIT,
            },
        },
        screen::{Screen, ScreenState},
        transactions::{client::fetch_transactions, TransactionPage, TransactionQuery},
    },
    storage::Session,
};
use std::sync::{Arc, RwLock};
use tracing::instrument;

/// Header block of the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileCard {
    pub name: String,
    pub email: String,
    pub ref_code: String,
    pub referral_url: String,
}

#[derive(Clone)]
pub struct DashboardController {
    api: ApiClient,
    referral_base_url: String,
    period: Arc<RwLock<SalesPeriod>>,
    profile: Screen<ManagerProfile>,
    sales: Screen<Vec<SalesPoint>>,
    recent: Screen<TransactionPage>,
}

impl DashboardController {
    #[must_use]
    pub fn new(api: ApiClient, referral_base_url: &str) -> Self {
        Self {
            api,
            referral_base_url: referral_base_url.to_string(),
            period: Arc::new(RwLock::new(SalesPeriod::default())),
            profile: Screen::new("profile"),
            sales: Screen::new("sales"),
            recent: Screen::new("recent-transactions"),
        }
    }

    /// Chart period used by the next [`DashboardController::load`].
    #[must_use]
    pub fn with_period(self, period: SalesPeriod) -> Self {
        *self
            .period
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = period;
        self
    }

    /// Runs the profile, sales and recent transaction fetches concurrently.
    ///
    /// # Errors
    /// Returns the route to send the user to when there is no session.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), Route> {
        let session = self.session()?;
        tokio::join!(
            self.fetch_profile(&session),
            self.fetch_sales(&session),
            self.fetch_recent(&session)
        );
        Ok(())
    }

    /// Switches the chart period and refetches only the chart.
    ///
    /// # Errors
    /// Returns the route to send the user to when there is no session.
    pub async fn set_period(&self, period: SalesPeriod) -> Result<(), Route> {
        *self
            .period
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = period;
        let session = self.session()?;
        self.fetch_sales(&session).await;
        Ok(())
    }

    #[must_use]
    pub fn period(&self) -> SalesPeriod {
        *self
            .period
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn profile_state(&self) -> ScreenState<ManagerProfile> {
        self.profile.snapshot()
    }

    #[must_use]
    pub fn sales_state(&self) -> ScreenState<Vec<SalesPoint>> {
        self.sales.snapshot()
    }

    #[must_use]
    pub fn recent_state(&self) -> ScreenState<TransactionPage> {
        self.recent.snapshot()
    }

    /// Name, email and referral link; falls back to the session identity for
    /// anything the profile has not supplied.
    #[must_use]
    pub fn profile_card(&self) -> Option<ProfileCard> {
        let session = self.api.store().read_session()?;
        let profile = self.profile.data().unwrap_or_default();
        let pick = |loaded: String, fallback: String| if loaded.is_empty() { fallback } else { loaded };

        let ref_code = pick(profile.ref_code, session.ref_code);
        Some(ProfileCard {
            name: pick(profile.name, session.manager_name),
            email: pick(profile.email, session.manager_email),
            referral_url: referral_url(&self.referral_base_url, &ref_code),
            ref_code,
        })
    }

    /// KPI cards for the loaded profile; `None` until it loads.
    #[must_use]
    pub fn kpis(&self) -> Option<Vec<Kpi>> {
        self.profile.data().map(|profile| kpis(&profile))
    }

    fn session(&self) -> Result<Session, Route> {
        guards::require_session(self.api.store()).inspect_err(|_| {
            let message = "Please log in to view the dashboard.";
            self.profile.fail(message);
            self.sales.fail(message);
            self.recent.fail(message);
        })
    }

    async fn fetch_profile(&self, session: &Session) {
        let ticket = self.profile.begin();
        let result = client::fetch_profile(&self.api, &session.manager_id).await;
        self.profile.settle(ticket, result);
    }

    async fn fetch_sales(&self, session: &Session) {
        let period = self.period();
        let ticket = self.sales.begin();
        let result = client::fetch_sales(&self.api, &session.manager_id, period).await;
        self.sales.settle(ticket, result);
    }

    async fn fetch_recent(&self, session: &Session) {
        let ticket = self.recent.begin();
        let query = TransactionQuery::recent(RECENT_TRANSACTIONS_LIMIT);
        let result = fetch_transactions(&self.api, &session.manager_id, &query).await;
        self.recent.settle(ticket, result);
    }
}

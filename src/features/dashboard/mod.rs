//! Dashboard screen: manager profile with referral link, KPI cards, sales
//! analytics and the most recent transactions. The three fetches are
//! independent; one failing does not blank the others.

pub mod client;
pub mod state;
pub mod types;

pub use state::DashboardController;
pub use types::{kpis, referral_url, Kpi, ManagerProfile, SalesPeriod, SalesPoint};

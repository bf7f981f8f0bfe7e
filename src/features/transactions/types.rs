use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Page sizes offered by the transactions table.
pub const PAGE_SIZES: [u32; 3] = [25, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// A referred purchase, as returned by `/transactions/getAll`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub usd_stake: Option<f64>,
    #[serde(default)]
    pub tokens: Option<f64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub utm_manager_details: Option<UtmManagerDetails>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmManagerDetails {
    #[serde(default)]
    pub manager_earnings: Option<f64>,
    #[serde(default)]
    pub commission_percent: Option<f64>,
}

impl Transaction {
    #[must_use]
    pub fn manager_earnings(&self) -> Option<f64> {
        self.utm_manager_details
            .as_ref()
            .and_then(|details| details.manager_earnings)
    }

    #[must_use]
    pub fn commission_percent(&self) -> Option<f64> {
        self.utm_manager_details
            .as_ref()
            .and_then(|details| details.commission_percent)
    }

    /// Tokens credited to the referrer: `tokens / commission percent`.
    /// `None` when either side is missing or the percent is zero.
    #[must_use]
    pub fn referral_tokens(&self) -> Option<f64> {
        let percent = self.commission_percent().filter(|percent| *percent != 0.0)?;
        Some(self.tokens? / percent)
    }
}

/// One server page of transactions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    #[serde(default)]
    pub items: Vec<Transaction>,
    #[serde(default, alias = "total")]
    pub total_items: u64,
}

/// Payment status filter. `All` is sent as an empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
    Failed,
}

impl StatusFilter {
    pub const ALL: [Self; 4] = [Self::All, Self::Completed, Self::Pending, Self::Failed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }

    /// Value of the `paymentStatus` query parameter.
    #[must_use]
    pub const fn query_value(self) -> &'static str {
        match self {
            Self::All => "",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown status filter: {value}"))
    }
}

/// Parameters of one transactions fetch. Changing anything but the page
/// number sends the user back to page 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionQuery {
    page: u32,
    page_size: u32,
    filter: String,
    status: StatusFilter,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filter: String::new(),
            status: StatusFilter::All,
            from_date: None,
            to_date: None,
        }
    }
}

impl TransactionQuery {
    /// First page of `limit` rows with no filters, for summary widgets.
    #[must_use]
    pub fn recent(limit: u32) -> Self {
        Self {
            page_size: limit.max(1),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub fn status(&self) -> StatusFilter {
        self.status
    }

    #[must_use]
    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.from_date, self.to_date)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// # Errors
    /// Returns a message when `size` is not one of [`PAGE_SIZES`].
    pub fn set_page_size(&mut self, size: u32) -> Result<(), String> {
        if !PAGE_SIZES.contains(&size) {
            return Err(format!("page size must be one of {PAGE_SIZES:?}"));
        }
        if size != self.page_size {
            self.page_size = size;
            self.page = 1;
        }
        Ok(())
    }

    pub fn set_filter(&mut self, filter: &str) {
        let filter = filter.trim();
        if filter != self.filter {
            filter.clone_into(&mut self.filter);
            self.page = 1;
        }
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        if status != self.status {
            self.status = status;
            self.page = 1;
        }
    }

    /// # Errors
    /// Returns a message when `from` is after `to`.
    pub fn set_date_range(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(), String> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err("start date must not be after end date".to_string());
            }
        }
        if (from, to) != (self.from_date, self.to_date) {
            self.from_date = from;
            self.to_date = to;
            self.page = 1;
        }
        Ok(())
    }

    /// Query parameters in the order the backend documents them.
    #[must_use]
    pub fn to_params(&self, manager_id: &str) -> Vec<(&'static str, String)> {
        let date = |value: Option<NaiveDate>| {
            value
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        vec![
            ("pageNumber", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("exportRequest", "false".to_string()),
            // Misspelled on the backend.
            ("refference", "true".to_string()),
            ("paymentStatus", self.status.query_value().to_string()),
            ("filter", self.filter.clone()),
            ("fromDate", date(self.from_date)),
            ("toDate", date(self.to_date)),
            ("utmManagerId", manager_id.to_string()),
        ]
    }
}

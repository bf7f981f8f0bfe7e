use crate::features::withdrawals::types::{WithdrawalStatus, DEFAULT_LIMIT};
use chrono::NaiveDate;
use std::{fmt, str::FromStr};

/// Status filter of the withdrawals table. `All` is sent as an empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WithdrawalStatusFilter {
    #[default]
    All,
    Only(WithdrawalStatus),
}

impl WithdrawalStatusFilter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Only(WithdrawalStatus::Pending),
        Self::Only(WithdrawalStatus::Processing),
        Self::Only(WithdrawalStatus::Completed),
        Self::Only(WithdrawalStatus::Rejected),
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    /// Value of the `status` query parameter.
    #[must_use]
    pub const fn query_value(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl fmt::Display for WithdrawalStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown withdrawal status: {value}"))
    }
}

/// Parameters of one withdrawals fetch. Every change except the page number
/// returns to page 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalQuery {
    page: u32,
    limit: u32,
    filter: String,
    status: WithdrawalStatusFilter,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
}

impl Default for WithdrawalQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            filter: String::new(),
            status: WithdrawalStatusFilter::All,
            from_date: None,
            to_date: None,
        }
    }
}

impl WithdrawalQuery {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub fn status(&self) -> WithdrawalStatusFilter {
        self.status
    }

    #[must_use]
    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.from_date, self.to_date)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_limit(&mut self, limit: u32) {
        let limit = limit.max(1);
        if limit != self.limit {
            self.limit = limit;
            self.page = 1;
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        let filter = filter.trim();
        if filter != self.filter {
            filter.clone_into(&mut self.filter);
            self.page = 1;
        }
    }

    pub fn set_status(&mut self, status: WithdrawalStatusFilter) {
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

    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let date = |value: Option<NaiveDate>| {
            value
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("status", self.status.query_value().to_string()),
            ("filter", self.filter.clone()),
            ("fromDate", date(self.from_date)),
            ("toDate", date(self.to_date)),
        ]
    }
}

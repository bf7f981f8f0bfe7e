use crate::features::format::{format_amount, format_compact, trim_number};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Rows shown in the dashboard's recent transactions widget.
pub const RECENT_TRANSACTIONS_LIMIT: u32 = 5;

/// Server-owned manager record; fetched fresh on every visit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerProfile {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub ref_code: String,
    #[serde(default)]
    pub commission_percent: Option<f64>,
    #[serde(default)]
    pub users_referred: Option<u64>,
    #[serde(default)]
    pub tokens_sold: Option<f64>,
    #[serde(default)]
    pub usd_stake: Option<f64>,
    #[serde(default)]
    pub user_reward_balance: Option<f64>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// One summary card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Kpi {
    pub title: &'static str,
    /// Short form shown on the card.
    pub value: String,
    /// Exact form shown on hover.
    pub full_value: String,
    pub badge: Option<&'static str>,
}

impl Kpi {
    fn new(title: &'static str, value: String, full_value: String) -> Self {
        Self {
            title,
            value,
            full_value,
            badge: None,
        }
    }
}

/// The five KPI cards derived from a profile. Missing figures count as zero.
#[must_use]
pub fn kpis(profile: &ManagerProfile) -> Vec<Kpi> {
    let referred = profile.users_referred.unwrap_or(0);
    let tokens_sold = profile.tokens_sold.unwrap_or(0.0);
    let usd_stake = profile.usd_stake.unwrap_or(0.0);
    let reward = profile.user_reward_balance.unwrap_or(0.0);
    let commission = format!("{}%", trim_number(profile.commission_percent.unwrap_or(0.0)));

    vec![
        Kpi::new(
            "Total Referrals",
            format!("{referred} Users"),
            format!("{referred} Users"),
        ),
        Kpi::new(
            "Total Volume Generated",
            format!("{} HABE", format_compact(tokens_sold)),
            format!("{} HABE", format_amount(tokens_sold)),
        ),
        Kpi::new(
            "Total Earnings",
            format!("${} USDT", format_amount(usd_stake)),
            format!("${} USDT", format_amount(usd_stake)),
        ),
        Kpi {
            badge: Some("Admin Set"),
            ..Kpi::new("Commission Rate", commission.clone(), commission)
        },
        Kpi::new(
            "Total Referral Tokens",
            format!("{} HABE", format_compact(reward)),
            format!("{} HABE", format_amount(reward)),
        ),
    ]
}

/// `<base>?ref=<code>`
#[must_use]
pub fn referral_url(base: &str, ref_code: &str) -> String {
    format!("{base}?ref={ref_code}")
}

/// Window of the sales analytics chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SalesPeriod {
    #[default]
    SevenDays,
    ThirtyDays,
    Yearly,
}

impl SalesPeriod {
    pub const ALL: [Self; 3] = [Self::SevenDays, Self::ThirtyDays, Self::Yearly];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenDays => "7days",
            Self::ThirtyDays => "30days",
            Self::Yearly => "yearly",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SevenDays => "Last 7 Days",
            Self::ThirtyDays => "Last 30 Days",
            Self::Yearly => "Yearly",
        }
    }

    /// Chart axis label for a bucket date; the raw value when it does not parse.
    #[must_use]
    pub fn format_label(self, date: &str) -> String {
        let pattern = match self {
            Self::SevenDays | Self::ThirtyDays => "%b %d",
            Self::Yearly => "%b %Y",
        };
        parse_bucket_date(date).map_or_else(|| date.to_string(), |day| day.format(pattern).to_string())
    }
}

impl fmt::Display for SalesPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesPeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|period| period.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown period: {value}"))
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` and `YYYY-MM`.
fn parse_bucket_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(day);
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBucket {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default, rename = "totalUSDStake")]
    pub total_usd_stake: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAnalytics {
    #[serde(default)]
    pub sales_data: Vec<SalesBucket>,
}

/// A bucket with its axis label already formatted for the period.
#[derive(Clone, Debug, PartialEq)]
pub struct SalesPoint {
    pub axis_label: String,
    pub bucket: SalesBucket,
}

impl SalesPoint {
    #[must_use]
    pub fn from_bucket(period: SalesPeriod, bucket: SalesBucket) -> Self {
        Self {
            axis_label: period.format_label(&bucket.date),
            bucket,
        }
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_LIMIT: u32 = 25;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

impl WithdrawalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    /// Numeric in some payloads, a string in others.
    #[serde(default, alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub withdrawal_id: String,
    #[serde(default)]
    pub withdrawal_date: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub status: WithdrawalStatus,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub processing_date: Option<String>,
    #[serde(default)]
    pub processing_fee: Option<f64>,
    #[serde(default)]
    pub final_amount: Option<f64>,
    #[serde(default)]
    pub admin_remarks: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Missing(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Missing(_) => String::new(),
    })
}

/// One server page of withdrawals. Accepts both payload spellings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPage {
    #[serde(default, alias = "withdrawals")]
    pub items: Vec<Withdrawal>,
    #[serde(default, alias = "total")]
    pub total_items: u64,
}

/// Totals shown above the withdrawals table, computed over the loaded rows.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WithdrawalSummary {
    pub total_withdrawn: f64,
    pub pending_amount: f64,
}

impl WithdrawalSummary {
    /// Completed rows count their final amount (or the requested amount when the
    /// final one is missing or zero); pending rows count the requested amount.
    #[must_use]
    pub fn from_rows(rows: &[Withdrawal]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match row.status {
                WithdrawalStatus::Completed => {
                    summary.total_withdrawn += row
                        .final_amount
                        .filter(|amount| *amount != 0.0)
                        .unwrap_or(row.amount);
                }
                WithdrawalStatus::Pending => summary.pending_amount += row.amount,
                _ => {}
            }
            summary
        })
    }
}

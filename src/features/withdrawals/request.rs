//! Withdrawal request form. Validation is local; submission goes through a
//! [`WithdrawalGateway`] because the backend has no submission endpoint yet.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const MIN_WITHDRAWAL: f64 = 10.0;
/// Upper bound of the processing fee.
pub const MAX_PROCESSING_FEE: f64 = 1.0;
pub const FEE_RATE: f64 = 0.01;
pub const DEFAULT_NOTE: &str = "Standard withdrawal request";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WithdrawalValidationError {
    #[error("Amount is required")]
    AmountRequired,
    #[error("Enter a valid amount")]
    AmountInvalid,
    #[error("Minimum withdrawal amount is $10")]
    BelowMinimum,
    #[error("Amount exceeds available balance")]
    ExceedsBalance,
    #[error("Wallet address is required")]
    WalletRequired,
    #[error("Invalid wallet address format")]
    WalletInvalid,
    #[error("You must agree to the withdrawal terms")]
    TermsNotAccepted,
}

/// Raw form input, as typed.
#[derive(Clone, Debug, Default)]
pub struct WithdrawalForm {
    pub amount: String,
    pub wallet_address: String,
    pub note: String,
    pub accepted_terms: bool,
}

/// A validated request ready for submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub wallet_address: String,
    pub note: String,
    pub processing_fee: f64,
    pub final_amount: f64,
}

/// 1% of the amount, capped at one dollar.
#[must_use]
pub fn processing_fee(amount: f64) -> f64 {
    (amount * FEE_RATE).min(MAX_PROCESSING_FEE)
}

#[must_use]
pub fn valid_wallet_address(address: &str) -> bool {
    Regex::new(r"^0x[a-fA-F0-9]{40}$").map_or(false, |re| re.is_match(address))
}

impl WithdrawalForm {
    /// Checks every field and reports all problems at once.
    ///
    /// # Errors
    /// Returns one entry per failing field, amount first.
    pub fn validate(
        &self,
        available_balance: f64,
    ) -> Result<WithdrawalRequest, Vec<WithdrawalValidationError>> {
        let mut errors = Vec::new();

        let amount = self.amount.trim();
        let parsed = if amount.is_empty() {
            errors.push(WithdrawalValidationError::AmountRequired);
            None
        } else {
            match amount.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    if value < MIN_WITHDRAWAL {
                        errors.push(WithdrawalValidationError::BelowMinimum);
                    } else if value > available_balance {
                        errors.push(WithdrawalValidationError::ExceedsBalance);
                    }
                    Some(value)
                }
                _ => {
                    errors.push(WithdrawalValidationError::AmountInvalid);
                    None
                }
            }
        };

        let wallet = self.wallet_address.trim();
        if wallet.is_empty() {
            errors.push(WithdrawalValidationError::WalletRequired);
        } else if !valid_wallet_address(wallet) {
            errors.push(WithdrawalValidationError::WalletInvalid);
        }

        if !self.accepted_terms {
            errors.push(WithdrawalValidationError::TermsNotAccepted);
        }

        match parsed {
            Some(amount) if errors.is_empty() => {
                let fee = processing_fee(amount);
                let note = self.note.trim();
                Ok(WithdrawalRequest {
                    amount,
                    wallet_address: wallet.to_string(),
                    note: if note.is_empty() {
                        DEFAULT_NOTE.to_string()
                    } else {
                        note.to_string()
                    },
                    processing_fee: fee,
                    final_amount: amount - fee,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Receives validated withdrawal requests.
pub trait WithdrawalGateway: Send + Sync {
    /// Submit a request or return an error to report it as failed.
    ///
    /// # Errors
    /// Implementations return any delivery failure.
    fn submit(&self, request: &WithdrawalRequest) -> anyhow::Result<()>;
}

/// Gateway that only records the request in the log; nothing is sent.
#[derive(Clone, Debug)]
pub struct LogWithdrawalGateway;

impl WithdrawalGateway for LogWithdrawalGateway {
    fn submit(&self, request: &WithdrawalRequest) -> anyhow::Result<()> {
        info!(
            amount = request.amount,
            final_amount = request.final_amount,
            wallet_address = %request.wallet_address,
            "withdrawal request recorded; no submission endpoint configured"
        );
        Ok(())
    }
}

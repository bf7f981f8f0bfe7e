use crate::{
    cli::{
        actions::{auth, dashboard, transactions, withdrawals, Action},
        commands::{
            auth::{ARG_CODE, ARG_EMAIL, CMD_LOGIN, CMD_LOGOUT, CMD_RESEND, CMD_STATUS, CMD_VERIFY},
            backend::{ARG_API_URL, ARG_REFERRAL_BASE_URL, ARG_STORAGE_DIR, ARG_TIMEOUT_SECONDS},
            screens::{
                ARG_ACCEPT_TERMS, ARG_AMOUNT, ARG_BALANCE, ARG_EXPORT, ARG_FILTER, ARG_FROM,
                ARG_LIMIT, ARG_NOTE, ARG_PAGE, ARG_PAGE_SIZE, ARG_PERIOD, ARG_STATUS, ARG_TO,
                ARG_WALLET, CMD_DASHBOARD, CMD_TRANSACTIONS, CMD_WITHDRAW, CMD_WITHDRAWALS,
            },
        },
        globals::GlobalArgs,
    },
    config::{AppConfig, DEFAULT_API_BASE_URL, DEFAULT_REFERRAL_BASE_URL},
    features::{
        dashboard::SalesPeriod,
        transactions::{types::DEFAULT_PAGE_SIZE, StatusFilter},
        withdrawals::{types::DEFAULT_LIMIT, WithdrawalStatusFilter},
    },
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;

/// Maps parsed arguments to the [`Action`] to run.
///
/// # Errors
/// Returns an error for an unknown subcommand or a missing required argument.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .context("a subcommand is required, see --help")?;
    let globals = global_args(sub_m);

    let action = match name {
        CMD_LOGIN => Action::Login(auth::LoginArgs {
            globals,
            email: required_string(sub_m, ARG_EMAIL)?,
        }),
        CMD_VERIFY => Action::Verify(auth::VerifyArgs {
            globals,
            code: required_string(sub_m, ARG_CODE)?,
        }),
        CMD_RESEND => Action::Resend(auth::Args { globals }),
        CMD_LOGOUT => Action::Logout(auth::Args { globals }),
        CMD_STATUS => Action::Status(auth::Args { globals }),
        CMD_DASHBOARD => Action::Dashboard(dashboard::Args {
            globals,
            period: sub_m
                .get_one::<SalesPeriod>(ARG_PERIOD)
                .copied()
                .unwrap_or_default(),
        }),
        CMD_TRANSACTIONS => Action::Transactions(transactions::Args {
            globals,
            page: page(sub_m),
            page_size: sub_m
                .get_one::<u32>(ARG_PAGE_SIZE)
                .copied()
                .unwrap_or(DEFAULT_PAGE_SIZE),
            filter: sub_m.get_one::<String>(ARG_FILTER).cloned().unwrap_or_default(),
            status: sub_m
                .get_one::<StatusFilter>(ARG_STATUS)
                .copied()
                .unwrap_or_default(),
            from: sub_m.get_one(ARG_FROM).copied(),
            to: sub_m.get_one(ARG_TO).copied(),
            export: export_path(sub_m),
        }),
        CMD_WITHDRAWALS => Action::Withdrawals(withdrawals::Args {
            globals,
            page: page(sub_m),
            limit: sub_m
                .get_one::<u32>(ARG_LIMIT)
                .copied()
                .unwrap_or(DEFAULT_LIMIT),
            filter: sub_m.get_one::<String>(ARG_FILTER).cloned().unwrap_or_default(),
            status: sub_m
                .get_one::<WithdrawalStatusFilter>(ARG_STATUS)
                .copied()
                .unwrap_or_default(),
            from: sub_m.get_one(ARG_FROM).copied(),
            to: sub_m.get_one(ARG_TO).copied(),
            export: export_path(sub_m),
        }),
        CMD_WITHDRAW => Action::Withdraw(withdrawals::RequestArgs {
            globals,
            amount: required_string(sub_m, ARG_AMOUNT)?,
            wallet_address: required_string(sub_m, ARG_WALLET)?,
            note: sub_m.get_one::<String>(ARG_NOTE).cloned().unwrap_or_default(),
            balance: sub_m.get_one::<f64>(ARG_BALANCE).copied(),
            accept_terms: sub_m.get_flag(ARG_ACCEPT_TERMS),
        }),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

// Backend args are global, so every subcommand's matches carry them.
fn global_args(matches: &ArgMatches) -> GlobalArgs {
    GlobalArgs {
        api_url: matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        storage_dir: matches
            .get_one::<String>(ARG_STORAGE_DIR)
            .map_or_else(AppConfig::default_storage_dir, PathBuf::from),
        referral_base_url: matches
            .get_one::<String>(ARG_REFERRAL_BASE_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_REFERRAL_BASE_URL.to_string()),
        timeout_seconds: matches
            .get_one::<u64>(ARG_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(0),
    }
}

fn required_string(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --{id}"))
}

fn page(matches: &ArgMatches) -> u32 {
    matches.get_one::<u32>(ARG_PAGE).copied().unwrap_or(1)
}

fn export_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>(ARG_EXPORT).cloned()
}

use crate::features::{
    dashboard::SalesPeriod,
    transactions::{types::PAGE_SIZES, StatusFilter},
    withdrawals::WithdrawalStatusFilter,
};
use chrono::NaiveDate;
use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const CMD_DASHBOARD: &str = "dashboard";
pub const CMD_TRANSACTIONS: &str = "transactions";
pub const CMD_WITHDRAWALS: &str = "withdrawals";
pub const CMD_WITHDRAW: &str = "withdraw";

pub const ARG_PERIOD: &str = "period";
pub const ARG_PAGE: &str = "page";
pub const ARG_PAGE_SIZE: &str = "page-size";
pub const ARG_LIMIT: &str = "limit";
pub const ARG_FILTER: &str = "filter";
pub const ARG_STATUS: &str = "status";
pub const ARG_FROM: &str = "from";
pub const ARG_TO: &str = "to";
pub const ARG_EXPORT: &str = "export";
pub const ARG_AMOUNT: &str = "amount";
pub const ARG_WALLET: &str = "wallet";
pub const ARG_NOTE: &str = "note";
pub const ARG_BALANCE: &str = "balance";
pub const ARG_ACCEPT_TERMS: &str = "accept-terms";

#[must_use]
pub fn validator_date() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<NaiveDate, String> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
    })
}

#[must_use]
pub fn validator_page_size() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<u32, String> {
        value
            .parse::<u32>()
            .ok()
            .filter(|size| PAGE_SIZES.contains(size))
            .ok_or_else(|| format!("page size must be one of {PAGE_SIZES:?}"))
    })
}

#[must_use]
pub fn validator_status() -> ValueParser {
    ValueParser::from(move |value: &str| value.parse::<StatusFilter>())
}

#[must_use]
pub fn validator_withdrawal_status() -> ValueParser {
    ValueParser::from(move |value: &str| value.parse::<WithdrawalStatusFilter>())
}

#[must_use]
pub fn validator_period() -> ValueParser {
    ValueParser::from(move |value: &str| value.parse::<SalesPeriod>())
}

fn export_arg() -> Arg {
    Arg::new(ARG_EXPORT)
        .long(ARG_EXPORT)
        .help("Write the loaded page as CSV to this path (a directory gets a dated file name)")
        .value_parser(clap::value_parser!(std::path::PathBuf))
}

fn filter_arg(help: &'static str) -> Arg {
    Arg::new(ARG_FILTER).long(ARG_FILTER).help(help)
}

fn from_arg() -> Arg {
    Arg::new(ARG_FROM)
        .long(ARG_FROM)
        .help("Start date, YYYY-MM-DD")
        .value_parser(validator_date())
}

fn to_arg() -> Arg {
    Arg::new(ARG_TO)
        .long(ARG_TO)
        .help("End date, YYYY-MM-DD")
        .value_parser(validator_date())
}

fn page_arg() -> Arg {
    Arg::new(ARG_PAGE)
        .long(ARG_PAGE)
        .help("Page number")
        .default_value("1")
        .value_parser(clap::value_parser!(u32).range(1..))
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_DASHBOARD)
                .about("Profile, KPIs, sales chart and recent transactions")
                .arg(
                    Arg::new(ARG_PERIOD)
                        .long(ARG_PERIOD)
                        .help("Sales period: 7days, 30days or yearly")
                        .default_value("7days")
                        .value_parser(validator_period()),
                ),
        )
        .subcommand(
            Command::new(CMD_TRANSACTIONS)
                .about("List referred transactions")
                .arg(page_arg())
                .arg(
                    Arg::new(ARG_PAGE_SIZE)
                        .long(ARG_PAGE_SIZE)
                        .help("Rows per page: 25, 50 or 100")
                        .default_value("25")
                        .value_parser(validator_page_size()),
                )
                .arg(filter_arg("Free-text search (hash, wallet)"))
                .arg(
                    Arg::new(ARG_STATUS)
                        .long(ARG_STATUS)
                        .help("Payment status: all, completed, pending or failed")
                        .default_value("all")
                        .value_parser(validator_status()),
                )
                .arg(from_arg())
                .arg(to_arg())
                .arg(export_arg()),
        )
        .subcommand(
            Command::new(CMD_WITHDRAWALS)
                .about("List withdrawals")
                .arg(page_arg())
                .arg(
                    Arg::new(ARG_LIMIT)
                        .long(ARG_LIMIT)
                        .help("Rows per page")
                        .default_value("25")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .arg(filter_arg("Free-text search (withdrawal id, wallet)"))
                .arg(
                    Arg::new(ARG_STATUS)
                        .long(ARG_STATUS)
                        .help("Withdrawal status: all, pending, processing, completed or rejected")
                        .default_value("all")
                        .value_parser(validator_withdrawal_status()),
                )
                .arg(from_arg())
                .arg(to_arg())
                .arg(export_arg()),
        )
        .subcommand(
            Command::new(CMD_WITHDRAW)
                .about("Validate a withdrawal request")
                .arg(
                    Arg::new(ARG_AMOUNT)
                        .long(ARG_AMOUNT)
                        .help("Amount in USDT")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_WALLET)
                        .long(ARG_WALLET)
                        .help("Destination wallet address (0x...)")
                        .env("REFDASH_WALLET")
                        .required(true),
                )
                .arg(Arg::new(ARG_NOTE).long(ARG_NOTE).help("Optional note"))
                .arg(
                    Arg::new(ARG_BALANCE)
                        .long(ARG_BALANCE)
                        .help("Available balance in USDT (default: total earnings from the profile)")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new(ARG_ACCEPT_TERMS)
                        .long(ARG_ACCEPT_TERMS)
                        .help("Accept the withdrawal terms")
                        .action(ArgAction::SetTrue),
                ),
        )
}

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_REFERRAL_BASE_URL};
use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STORAGE_DIR: &str = "storage-dir";
pub const ARG_REFERRAL_BASE_URL: &str = "referral-base-url";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Dashboard API base URL")
                .env("REFDASH_API_URL")
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORAGE_DIR)
                .long(ARG_STORAGE_DIR)
                .help("Directory holding the persisted session (default: platform data dir)")
                .env("REFDASH_STORAGE_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_REFERRAL_BASE_URL)
                .long(ARG_REFERRAL_BASE_URL)
                .help("Base URL of referral links")
                .env("REFDASH_REFERRAL_BASE_URL")
                .default_value(DEFAULT_REFERRAL_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long(ARG_TIMEOUT_SECONDS)
                .help("Request timeout in seconds, 0 waits indefinitely")
                .env("REFDASH_TIMEOUT_SECONDS")
                .default_value("0")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
}

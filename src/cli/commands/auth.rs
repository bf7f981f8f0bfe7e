use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_VERIFY: &str = "verify";
pub const CMD_RESEND: &str = "resend";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";

pub const ARG_EMAIL: &str = "email";
pub const ARG_CODE: &str = "code";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Email a one-time login code")
                .arg(
                    Arg::new(ARG_EMAIL)
                        .help("Manager email address")
                        .env("REFDASH_EMAIL")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_VERIFY)
                .about("Complete login with the emailed six-digit code")
                .arg(Arg::new(ARG_CODE).help("One-time code").required(true)),
        )
        .subcommand(Command::new(CMD_RESEND).about("Email a new code for the pending login"))
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the local session"))
        .subcommand(Command::new(CMD_STATUS).about("Show the login state"))
}

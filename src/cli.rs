//! Command line interface built on clap.
//!
//! [`Cli`] has two subcommands: `bot` runs the Telegram dialogue and `fetch`
//! stores one page of results in PostgreSQL.

use clap::{Parser, Subcommand};

/// hh.ru vacancy search: Telegram bot and batch fetcher.
#[derive(Debug, Parser)]
#[command(name = "vacancy-bot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (RUST_LOG still takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs the Telegram bot with long polling.
    Bot,

    /// Fetches one page of vacancies and inserts it into PostgreSQL.
    ///
    /// Arguments: <title> <salary> <experience> <city> <schedule>.
    /// The salary must contain two numbers, e.g. "от 50000 до 100000".
    Fetch {
        /// Positional values, checked after parsing so that a short list
        /// exits with status 1 and the usage line.
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

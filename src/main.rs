mod batch;
mod bot;
mod cli;
mod config;
mod criteria;
mod error;
mod fetcher;
mod hh;
mod session;
mod telegram;
mod ui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use batch::{BatchArgs, BatchTarget, USAGE};
use cli::{Cli, Command};
use config::AppConfig;
use error::AppError;
use fetcher::{PAGE_SIZE, VacancyFetcher};
use hh::HhClient;
use session::Conversation;
use telegram::TelegramClient;
use ui::BatchProgress;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "debug,hyper=info,sqlx=warn"
    } else {
        "info,sqlx=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_bot(config: AppConfig) -> Result<()> {
    let token = config.require_telegram_token()?.to_string();
    let hh = HhClient::with_base_url(&config.user_agent, config.hh_api_url.clone())
        .context("failed to build hh.ru client")?;
    let conversation = Conversation::new(VacancyFetcher::new(hh, PAGE_SIZE));
    let telegram = TelegramClient::with_base_url(token, config.telegram_api_url.clone());

    bot::run(telegram, conversation, config.poll_timeout_secs).await
}

async fn run_fetch(config: AppConfig, args: BatchArgs) -> Result<()> {
    let database_url = config.require_database_url()?;
    let hh = HhClient::with_base_url(&config.user_agent, config.hh_api_url.clone())
        .context("failed to build hh.ru client")?;
    let fetcher = VacancyFetcher::new(hh, PAGE_SIZE);
    let target = BatchTarget {
        admin_url: &config.admin_database_url,
        database_url,
        database_name: &config.database_name,
    };

    let progress = BatchProgress::start(&args.title);
    match batch::run(&fetcher, &target, &args).await {
        Ok(inserted) => {
            progress.finish(inserted);
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Bot => {
            let config = AppConfig::load().context("failed to load configuration")?;
            run_bot(config).await
        }
        Command::Fetch { args } => {
            // Checked before any config, network or database work.
            let args = BatchArgs::parse(&args).map_err(AppError::from)?;
            let config = AppConfig::load().context("failed to load configuration")?;
            run_fetch(config, args).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_failure(&e)),
    }
}

/// Prints a failed run once and returns the process exit status.
fn report_failure(e: &anyhow::Error) -> u8 {
    if let Some(AppError::Usage(usage_error)) = e.downcast_ref::<AppError>() {
        ui::print_usage_error(usage_error, USAGE);
    } else {
        error!("{e:#}");
    }
    1
}

use std::io::Write;

use color_eyre::Result;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Args;
use crate::config::IagConfig;

mod app;
mod cli;
mod client;
mod config;
mod error;
mod model;
mod output;
#[cfg(test)]
mod test_support;

const LOG_ENV: &str = "IAG_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging();
    debug!("Starting iag-inventory");

    let args = Args::parse_lenient();
    let config = IagConfig::from_env();

    let document = app::run(&args, config).await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{document}")?;
    stdout.flush()?;

    Ok(())
}

/// Logs go to stderr; stdout is reserved for the inventory document.
fn initialize_logging() -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var(LOG_ENV)
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    guard
}

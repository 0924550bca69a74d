// theme-log - check, sanitize and emit theme log details
//
// Startup order: parse args, load config (a broken config file is fatal),
// install the tracing subscriber, then run the command.

use anyhow::{Context, Result};
use clap::Parser;
use theme_log::cli::{self, Cli};
use theme_log::config::Config;
use theme_log::telemetry;

fn main() -> Result<()> {
    let args = Cli::parse();

    let config = match args.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    // Keep the guard alive so file logs flush on exit
    let _file_guard = telemetry::init(&config.logging)?;

    tracing::debug!(
        version = theme_log::config::VERSION,
        conformance = config.details.conformance.as_str(),
        "configuration loaded"
    );

    cli::run(args, &config)
}

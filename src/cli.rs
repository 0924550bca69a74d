// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - check:    validate a JSON payload against the theme log details shape
// - emit:     build theme log details from flags and log them
// - sanitize: turn arbitrary JSON into a details map
// - config:   show or reset configuration

use crate::config::{Config, VERSION};
use crate::conformance::{parse_details_str, Conformance};
use crate::details::ThemeLogDetails;
use crate::logging::{LogLevel, ThemeLogger};
use crate::sanitize::to_log_details;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Structured logging for theme events
#[derive(Parser, Debug)]
#[command(name = "theme-log")]
#[command(version = VERSION)]
#[command(about = "Check, sanitize and emit theme log details", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.config/theme-log/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a JSON payload and print its normalized form
    Check {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Fold unknown fields into `details` instead of rejecting them
        #[arg(long, conflicts_with = "strict")]
        open: bool,

        /// Reject unknown fields
        #[arg(long)]
        strict: bool,
    },

    /// Log a theme event
    Emit(EmitArgs),

    /// Convert arbitrary JSON into a details map
    Sanitize {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write the default config file
        #[arg(long)]
        reset: bool,

        /// Overwrite an existing file when resetting
        #[arg(long, requires = "reset")]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct EmitArgs {
    /// Log message
    pub text: String,

    /// Theme identifier
    #[arg(long)]
    pub theme: Option<String>,

    /// Mark the operation as successful
    #[arg(long)]
    pub success: bool,

    /// Mark the operation as failed
    #[arg(long)]
    pub error: bool,

    /// Error message
    #[arg(long)]
    pub message: Option<String>,

    /// Extra detail as key=value (value parsed as JSON when possible)
    #[arg(long = "detail", value_parser = parse_detail_pair)]
    pub details: Vec<(String, Value)>,

    /// Level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    pub level: String,

    /// Component reporting the event
    #[arg(long, default_value = "theme-log")]
    pub source: String,
}

/// Parse `key=value`; the value is JSON if it parses, a plain string otherwise
pub fn parse_detail_pair(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Build the details carried by an emitted event
pub fn build_details(args: &EmitArgs) -> ThemeLogDetails {
    let mut details = ThemeLogDetails::new();
    if let Some(theme) = &args.theme {
        details = details.with_theme(theme.clone());
    }
    if args.success {
        details = details.with_success(true);
    }
    if args.error {
        details = details.with_error(true);
    }
    if let Some(message) = &args.message {
        details = details.with_error_message(message.clone());
    }
    for (key, value) in &args.details {
        details = details.with_detail(key.clone(), value.clone());
    }
    details
}

/// Policy from flags, falling back to configuration
pub fn policy_for(open: bool, strict: bool, config: &Config) -> Conformance {
    if open {
        Conformance::Open
    } else if strict {
        Conformance::Strict
    } else {
        config.details.conformance
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("could not read stdin")?;
            Ok(buf)
        }
    }
}

/// Run the parsed command
pub fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Check { file, open, strict } => {
            handle_check(file.as_deref(), policy_for(open, strict, config))
        }
        Commands::Emit(args) => handle_emit(&args),
        Commands::Sanitize { file } => handle_sanitize(file.as_deref()),
        Commands::Config {
            show,
            path,
            reset,
            force,
        } => {
            if path {
                handle_config_path(cli.config.as_deref())
            } else if reset {
                handle_config_reset(cli.config.as_deref(), force)
            } else if show {
                handle_config_show(config);
                Ok(())
            } else {
                println!("Usage: theme-log config [--show|--path|--reset [--force]]");
                Ok(())
            }
        }
    }
}

fn handle_check(file: Option<&Path>, policy: Conformance) -> Result<()> {
    let input = read_input(file)?;
    let details = parse_details_str(&input, policy)
        .map_err(|e| anyhow!("payload does not conform ({} policy): {}", policy.as_str(), e))?;

    tracing::debug!(
        policy = policy.as_str(),
        outcome = details.outcome().as_str(),
        "payload conforms"
    );
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}

fn handle_emit(args: &EmitArgs) -> Result<()> {
    let level = LogLevel::parse(&args.level)
        .ok_or_else(|| anyhow!("unknown level {:?}", args.level))?;
    let details = build_details(args);
    ThemeLogger::new(args.source.clone()).log(level, &args.text, &details);
    Ok(())
}

fn handle_sanitize(file: Option<&Path>) -> Result<()> {
    let input = read_input(file)?;
    let value: Value = serde_json::from_str(&input).context("input is not valid JSON")?;
    let details = to_log_details(&value);
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(Config::config_path)
        .ok_or_else(|| anyhow!("could not determine config path"))
}

fn handle_config_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(explicit)?.display());
    Ok(())
}

fn handle_config_show(config: &Config) {
    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
}

fn handle_config_reset(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_path(explicit)?;

    if path.exists() && !force {
        bail!(
            "config file exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("could not write {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

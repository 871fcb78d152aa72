//! # nuquery-cli
//!
//! Command-line front end for the nuquery package documentation service.
//!
//! One-shot subcommands answer a single query and exit. `nuquery serve` keeps a
//! single service (and its cache) alive and answers JSON tool calls, one per
//! line, on stdin/stdout.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use nuquery_core::error::QueryError;
use output::colors::ColorSupport;
use output::errors::ErrorFormatter;
use output::OutputHandler;

/// Query NuGet package documentation, metadata and search
#[derive(Parser)]
#[command(name = "nuquery", version, about = "NuGet package documentation lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file to use instead of searching for nuquery.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print README-like documentation for a package
    Content {
        package_id: String,
        /// Exact version, or "latest"
        #[arg(default_value = "latest")]
        package_version: String,
        #[arg(long)]
        no_examples: bool,
        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },
    /// Show package metadata and dependencies
    Info {
        package_id: String,
        #[arg(long)]
        no_dependencies: bool,
        #[arg(long)]
        dev_dependencies: bool,
        #[arg(long)]
        json: bool,
    },
    /// Search the registry
    Search {
        query: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Minimum quality score (0..=1)
        #[arg(long)]
        quality: Option<f64>,
        /// Minimum popularity score (0..=1)
        #[arg(long)]
        popularity: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Answer JSON tool calls on stdin until EOF or Ctrl-C
    Serve,
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_json);
    setup_panic_handler();

    info!("Starting nuquery v{}", env!("CARGO_PKG_VERSION"));

    let colors = ColorSupport::choose(cli.no_color);
    match run_cli(cli, colors) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let formatter = ErrorFormatter::with_colors(colors);
            match err.downcast_ref::<QueryError>() {
                Some(query_err) => eprintln!("{}", formatter.format_error(query_err)),
                None => eprintln!("{}", formatter.format_report(&err)),
            }
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli, colors: ColorSupport) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| QueryError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        if let Commands::Version = cli.command {
            commands::show_version();
            return Ok(());
        }

        let ctx = CommandContext::load(cli.config, OutputHandler::with_colors(colors)).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

/// Logs go to stderr; stdout carries command output and tool replies.
fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nuquery={}", level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("nuquery encountered an unexpected error: {}", panic_info);
        eprintln!("nuquery crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}

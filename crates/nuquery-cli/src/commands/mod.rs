//! Command implementations and dispatch logic.

use anyhow::Context;
use camino::Utf8PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use nuquery_config::ConfigLoader;
use nuquery_core::error::QueryError;
use nuquery_service::{ContentQuery, InfoQuery, PackageService, SearchQuery, TOOL_NAMES};

pub mod serve;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub service: Arc<PackageService>,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load configuration from the current directory and build the service
    pub async fn load(
        config_path: Option<Utf8PathBuf>,
        output: OutputHandler,
    ) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| QueryError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|path| anyhow::anyhow!("Current directory is not UTF-8: {}", path.display()))?;

        let (config, sources) = ConfigLoader::from_process(cwd)
            .with_config_path(config_path)
            .load()
            .await?;
        debug!("Configuration sources: {:?}", sources);

        Ok(Self {
            service: Arc::new(PackageService::from_config(&config)?),
            output,
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    let outcome = match command {
        Commands::Content {
            package_id,
            package_version,
            no_examples,
            json,
        } => {
            info!("Fetching content for {} {}", package_id, package_version);
            let query = ContentQuery {
                package_id,
                version: package_version,
                include_examples: !no_examples,
            };
            content(ctx, &query, json).await
        },
        Commands::Info {
            package_id,
            no_dependencies,
            dev_dependencies,
            json,
        } => {
            info!("Fetching info for {}", package_id);
            let query = InfoQuery {
                package_id,
                include_dependencies: !no_dependencies,
                include_dev_dependencies: dev_dependencies,
            };
            package_info(ctx, &query, json).await
        },
        Commands::Search {
            query,
            limit,
            quality,
            popularity,
            json,
        } => {
            info!("Searching for '{}'", query);
            let query = SearchQuery {
                query,
                limit,
                quality,
                popularity,
            };
            search(ctx, &query, json).await
        },
        Commands::Serve => {
            info!("Serving tool calls on stdin ({})", TOOL_NAMES.join(", "));
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let service = Arc::clone(&ctx.service);
            let handled =
                serve::serve(service, stdin, tokio::io::stdout(), shutdown_signal()).await?;
            info!("Handled {} tool call(s)", handled);
            return Ok(());
        },
        Commands::Version => {
            show_version();
            Ok(())
        },
    };

    ctx.service.shutdown();
    outcome
}

async fn content(ctx: &CommandContext, query: &ContentQuery, json: bool) -> anyhow::Result<()> {
    let response = ctx.service.fetch_content(query).await?;
    if !response.exists {
        ctx.output.warn(&format!("{} {} does not exist", query.package_id, query.version));
    }

    if json {
        ctx.output.print(&to_pretty_json(&response)?);
    } else {
        ctx.output.print(&ctx.output.render_content(&response));
    }
    Ok(())
}

async fn package_info(ctx: &CommandContext, query: &InfoQuery, json: bool) -> anyhow::Result<()> {
    let response = ctx.service.fetch_info(query).await?;

    if json {
        ctx.output.print(&to_pretty_json(&response)?);
    } else {
        ctx.output.print(&ctx.output.render_info(&response));
    }
    Ok(())
}

async fn search(ctx: &CommandContext, query: &SearchQuery, json: bool) -> anyhow::Result<()> {
    let response = ctx.service.search(query).await?;
    if response.results.is_empty() {
        ctx.output.info("No packages matched; try lowering --quality or --popularity");
    }

    if json {
        ctx.output.print(&to_pretty_json(&response)?);
    } else {
        ctx.output.print(&ctx.output.render_search(&response));
    }
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to encode response")
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub fn show_version() {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    println!("nuquery v{}", env!("CARGO_PKG_VERSION"));
    println!("Built: {}", env!("BUILD_DATE"));
    println!("Target: {}", target);
    println!("Rust: {}", env!("RUSTC_VERSION"));
}

/// Closest known tool name, for typos like `fetch-contnet`
pub fn suggest_similar_tool(input: &str) -> Option<&'static str> {
    let input = input.trim().to_ascii_lowercase().replace('_', "-");

    TOOL_NAMES
        .iter()
        .map(|&name| (name, edit_distance(&input, name)))
        .filter(|&(_, distance)| distance <= 3)
        .min_by_key(|&(_, distance)| distance)
        .map(|(name, _)| name)
}

/// Levenshtein distance between two strings
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

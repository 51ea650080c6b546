// MCP Hub - Main Entry Point
//
// CLI over the multi-server MCP client manager:
// - registers servers from the TOML config
// - fans operations out across them concurrently
// - prints aggregated JSON results

use anyhow::Result;
use clap::{Parser, Subcommand};
use mcp_hub::commands;
use mcp_hub::config::Config;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// MCP Hub: multi-server Model Context Protocol client
#[derive(Parser, Debug)]
#[command(name = "mcp-hub")]
#[command(author = "MCP Hub Contributors")]
#[command(version)]
#[command(about = "Manage and query multiple MCP servers", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file (default: XDG config dir)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Health-check every registered server
    Health,
    /// Show the capabilities each server advertises
    Capabilities,
    /// List tools across servers that support them
    Tools,
    /// Collect prompt suggestions across servers
    Prompts,
    /// Fetch context from every enabled server
    Context {
        /// Optional user message to send with the request
        #[arg(long)]
        message: Option<String>,
    },
    /// Execute a tool on one named server
    Call {
        /// Server id from the configuration
        server: String,

        /// Tool identifier to execute
        tool: String,

        /// Tool parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .init();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let Some(command) = args.command else {
        info!("No command specified. Use \"mcp-hub --help\" for usage.");
        return Ok(());
    };

    let manager = commands::build_manager(&config).await;

    let output = match command {
        Commands::Health => commands::check_health(&manager).await?,
        Commands::Capabilities => commands::get_capabilities(&manager).await?,
        Commands::Tools => commands::list_tools(&manager).await?,
        Commands::Prompts => commands::list_prompts(&manager).await?,
        Commands::Context { message } => commands::get_context(&manager, message).await?,
        Commands::Call {
            server,
            tool,
            params,
        } => commands::call_tool(&manager, &server, &tool, params).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

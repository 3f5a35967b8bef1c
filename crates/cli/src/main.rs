//! Cookbook CLI
//!
//! Main entry point for the `cookbook` command-line tool.
//! Ingests a recipe dataset and answers questions about it, either once
//! from the terminal or as an HTTP service.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, ServeCommand, StatsCommand};
use cookbook_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Cookbook - question answering over a Vietnamese recipe collection
#[derive(Parser, Debug)]
#[command(name = "cookbook")]
#[command(about = "Question answering over a recipe collection", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COOKBOOK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.cookbook/config.yaml)
    #[arg(short, long, global = true, env = "COOKBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Model identifier for answer generation
    #[arg(short, long, global = true, env = "COOKBOOK_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the recipe dataset into the vector store
    Ingest(IngestCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Run the HTTP chat service
    Serve(ServeCommand),

    /// Show vector store statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, then config file, then environment
    let config = AppConfig::load_from(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.model, cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Cookbook CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("LLM provider: {}", config.llm.active_provider);
    tracing::debug!("Embedding: {} ({})", config.embedding.provider, config.embedding.model);

    config.validate()?;
    config.ensure_cookbook_dir()?;

    // Emit command.start span
    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Serve(_) => "serve",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

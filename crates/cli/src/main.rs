//! ReAG CLI
//!
//! Ask questions against a file of documents, once or as a conversation.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChatCommand, QueryCommand};
use reag_core::{config::ReagConfig, logging, AppResult};
use std::path::PathBuf;

/// ReAG - answer questions by letting the model read each document
#[derive(Parser, Debug)]
#[command(name = "reag")]
#[command(about = "Retrieval-enhanced answer generation over your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model identifier, optionally prefixed with a provider (ollama/deepseek-r1)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Documents sent concurrently per batch
    #[arg(short, long, global = true)]
    batch_size: Option<usize>,

    /// Response style (structured, reasoning)
    #[arg(long, global = true)]
    response_style: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question against a documents file
    Query(QueryCommand),

    /// Interactive conversation that remembers earlier answers
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // File, then environment, then flags
    let mut config = ReagConfig::load_from(cli.config)?.with_overrides(
        cli.model,
        cli.endpoint,
        cli.batch_size,
        cli.response_style,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    config.log_json |= cli.log_json;

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("ReAG CLI starting");
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Batch size: {}", config.batch_size);

    let command_name = match &cli.command {
        Commands::Query(_) => "query",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

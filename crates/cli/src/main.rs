//! docqa CLI
//!
//! Ask questions about PDF, text or web documents from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, InspectCommand, SettingsCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// docqa - question answering over your documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions about PDF, text and web documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Generation provider (openrouter, ollama)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question about files or a web page
    Ask(AskCommand),

    /// Chat about files or a web page
    Chat(ChatCommand),

    /// Load and chunk sources, then print corpus statistics
    Inspect(InspectCommand),

    /// Show the active configuration
    Settings(SettingsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // .env, config file and environment; CLI flags win
    let config = AppConfig::load_from(cli.config.as_deref())?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("docqa starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!(
        "Provider: {}, model: {}",
        config.generation.provider,
        config.generation.model
    );

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Inspect(_) => "inspect",
        Commands::Settings(_) => "settings",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => {
            config.validate()?;
            cmd.execute(&config).await
        }
        Commands::Chat(cmd) => {
            config.validate()?;
            cmd.execute(&config).await
        }
        Commands::Inspect(cmd) => {
            config.validate_retrieval()?;
            cmd.execute(&config).await
        }
        Commands::Settings(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

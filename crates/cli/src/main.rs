//! Parley CLI: the main entry point.
//!
//! Commands:
//! - `onboard`    Write the default config
//! - `chat`       Interactive chat or single-message mode
//! - `classify`   Show how a query would be routed
//! - `providers`  Show provider availability
//! - `context`    Dump a conversation's relevant context
//! - `status`     Show the loaded configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley: conversational model router with bounded memory",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Conversation to continue
        #[arg(short, long, default_value = "local")]
        conversation: String,
    },

    /// Classify a query and show the provider it would go to
    Classify {
        query: String,
    },

    /// Show provider availability
    Providers {
        /// Run a health check against every provider first
        #[arg(long)]
        probe: bool,
    },

    /// Print the relevant context of a conversation as JSON
    Context {
        conversation: String,
    },

    /// Show the loaded configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            conversation,
        } => commands::chat::run(message, conversation).await?,
        Commands::Classify { query } => commands::classify::run(&query).await?,
        Commands::Providers { probe } => commands::providers::run(probe).await?,
        Commands::Context { conversation } => commands::context::run(&conversation).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}

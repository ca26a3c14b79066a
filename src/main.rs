//! Chatling - chat client CLI
//!
#![doc = "Chatling - chat client for a hosted conversation backend"]
#![doc = "Main entry point for the Chatling application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatling::cli::{Cli, Commands};
use chatling::commands;
use chatling::config::{default_config_path, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load(default_config_path())?,
    };

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { user_id } => {
            tracing::info!("Starting interactive chat session");
            commands::chat::run_chat(config, user_id).await?;
            Ok(())
        }
        Commands::Conversations { user_id, json } => {
            tracing::info!("Listing conversations");
            commands::conversations::list_conversations(&config, user_id, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatling=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

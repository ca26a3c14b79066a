//! Command-line interface definition for Chatling
//!
//! Defines the clap-derived CLI surface. Command handling lives in
//! [`crate::commands`]; this module only describes arguments.

use clap::{Parser, Subcommand};

/// Chat client for a hosted conversation backend
#[derive(Debug, Parser)]
#[command(name = "chatling", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Already-resolved user id (the sign-in flow lives outside this CLI)
        #[arg(long, env = "CHATLING_USER_ID")]
        user_id: Option<String>,
    },

    /// List a user's conversations and exit
    Conversations {
        /// Already-resolved user id
        #[arg(long, env = "CHATLING_USER_ID")]
        user_id: Option<String>,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

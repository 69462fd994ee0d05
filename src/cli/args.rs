//! CLI argument definitions using clap.
//!
//! Commands:
//! - feedcast init --config <path>
//! - feedcast schema --config <path>
//! - feedcast start --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// feedcast - schema-typed data feeds over a distributed record store
#[derive(Parser, Debug)]
#[command(name = "feedcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config file and create the data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./feedcast.json")]
        config: PathBuf,
    },

    /// Validate the schema config and persist the canonical schema
    Schema {
        /// Path to configuration file
        #[arg(long, default_value = "./feedcast.json")]
        config: PathBuf,
    },

    /// Start the feed service
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./feedcast.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

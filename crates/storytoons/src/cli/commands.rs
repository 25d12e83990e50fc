//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// StoryToons - describe a scene, get a comic, a story and a narration
#[derive(Parser, Debug)]
#[command(name = "storytoons")]
#[command(about = "Turn a description into a comic image, a story and a narration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the standard locations
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline once for a description
    Generate {
        /// Scene to illustrate
        description: String,

        /// Directory to persist the image and narration in
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Serve the JSON API
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },

    /// Show the provider configured for each stage
    Providers {
        /// Print the bindings as JSON
        #[arg(long)]
        json: bool,
    },
}

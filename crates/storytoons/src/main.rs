//! StoryToons CLI binary.
//!
//! This binary provides command-line access to the pipeline:
//! - Generate an image, story and narration for one description
//! - Serve the JSON API
//! - Inspect the configured providers

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, list_providers, run_generate, run_server};

    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    #[cfg(feature = "observability")]
    storytoons::observability::init_observability(
        storytoons::observability::ObservabilityConfig::default()
            .with_log_level(if cli.verbose { "debug" } else { "info" })
            .with_json_logs(cli.json_logs),
    )?;
    #[cfg(not(feature = "observability"))]
    storytoons::init_logging(cli.verbose, cli.json_logs);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Generate {
            description,
            output_dir,
        } => {
            run_generate(&description, output_dir, config_path).await?;
        }

        Commands::Serve { bind } => {
            run_server(bind, config_path).await?;
        }

        Commands::Providers { json } => {
            list_providers(config_path, json)?;
        }
    }

    Ok(())
}

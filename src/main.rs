//! fetchclip
//!
//! Command-line front end that downloads a video by URL and cuts a clip out
//! of it.
//!
//! # Usage
//!
//! ```bash
//! fetchclip clip --url "https://example.com/watch?v=abc" --quality 720 --start 1:00 --end 1:30
//! fetchclip session
//! fetchclip time 2:22 90
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use fetchclip::adapters::tracing_log::init_subscriber;
use fetchclip::app::container::DefaultAppContainer;
use fetchclip::cli::{commands, Cli, Commands};
use fetchclip::config_initialization::initialize_configuration;

/// Main entry point for the fetchclip CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = initialize_configuration(&cli)?;
    init_subscriber(loaded.config.log_level()?, loaded.config.logging.json);
    info!("Starting fetchclip");
    loaded.log_sources();
    let config = loaded.config;

    let mut stdout = std::io::stdout();

    if let Commands::Time(args) = &cli.command {
        return commands::time(args, &mut stdout);
    }

    let container = DefaultAppContainer::new(&config).context("Failed to set up tools")?;
    let default_quality = config.default_quality()?;

    match cli.command {
        Commands::Clip(args) => {
            info!("Executing clip command");
            commands::clip(&container, args, default_quality, &mut stdout).await?;
        }
        Commands::Session(args) => {
            info!("Executing session command");
            let input = BufReader::new(tokio::io::stdin());
            commands::session(
                &container,
                args.quality.unwrap_or(default_quality),
                input,
                &mut stdout,
            )
            .await?;
        }
        Commands::Time(_) => {}
    }

    info!("fetchclip completed successfully");
    Ok(())
}

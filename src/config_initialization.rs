//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};

/// Final configuration and where its values came from
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    pub config: AppConfig,
    pub file: Option<PathBuf>,
    pub env_overrides: Vec<&'static str>,
}

impl LoadedConfiguration {
    /// Report the configuration sources; call once logging is installed
    pub fn log_sources(&self) {
        match &self.file {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => debug!("No configuration file, using defaults"),
        }
        if !self.env_overrides.is_empty() {
            debug!(
                "Applied environment overrides: {}",
                self.env_overrides.join(", ")
            );
        }
    }
}

/// Build the configuration with precedence CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<LoadedConfiguration> {
    initialize_configuration_with(cli, |name| std::env::var(name).ok())
}

/// Same as [`initialize_configuration`] with an injectable environment
pub fn initialize_configuration_with<F>(cli: &Cli, env: F) -> Result<LoadedConfiguration>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, file) = load_config_file(cli)?;

    let env_overrides = TomlConfigAdapter::apply_env_overrides(&mut config, env)
        .context("Invalid environment override")?;

    apply_cli_configuration_overrides(&mut config, cli);

    config.validate().context("Invalid configuration")?;
    Ok(LoadedConfiguration {
        config,
        file,
        env_overrides,
    })
}

/// An explicit `--config` must exist; the default locations are optional
fn load_config_file(cli: &Cli) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => match TomlConfigAdapter::discover() {
            Some(path) => path,
            None => return Ok((AppConfig::default(), None)),
        },
    };
    let config = TomlConfigAdapter::load_file(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok((config, Some(path)))
}

fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if let Some(timeout) = cli.timeout {
        config.tools.timeout_secs = timeout;
    }
    if let Commands::Clip(args) = &cli.command {
        if args.unique {
            config.storage.unique_derived_names = true;
        }
    }
}

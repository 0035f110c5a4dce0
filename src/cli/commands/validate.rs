//! Validate command implementation

use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use tracing::info;

use crate::cli::utils;
use crate::RegistryConfig;

pub fn command() -> Command {
    Command::new("validate")
        .about("Validate configuration file")
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file path")
                .value_name("FILE"),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    info!("Validating configuration file");

    let path = utils::get_config_path(matches).ok_or_else(|| {
        anyhow!("No configuration file found. Use --config to specify a file")
    })?;
    let config = RegistryConfig::from_file(&path)?;

    println!("Configuration file is valid!");
    println!("Version: {}", config.version);
    println!("Namespace: {}", config.namespace);
    println!("Strict: {}", config.strict);
    println!("Manifest directories:");
    for dir in config.resolved_manifest_directories()? {
        println!("  - {}", dir.display());
    }
    if !config.aliases.is_empty() {
        println!("Aliases:");
        for alias in &config.aliases {
            println!("  - {} -> {}", alias.name, alias.target);
        }
    }

    Ok(())
}

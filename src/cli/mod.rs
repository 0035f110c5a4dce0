//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("ingest-sources")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Inspect the registry of metadata ingestion sources")
            .subcommand(commands::list::command())
            .subcommand(commands::info::command())
            .subcommand(commands::check::command())
            .subcommand(commands::validate::command())
    }

    /// Run the CLI application
    pub fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("list", sub_matches)) => commands::list::run(sub_matches),
            Some(("info", sub_matches)) => commands::info::run(sub_matches),
            Some(("check", sub_matches)) => commands::check::run(sub_matches),
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches),
            _ => {
                // No subcommand provided, show help
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use anyhow::{Context, Result};
    use clap::{Arg, ArgAction, ArgMatches};
    use std::path::PathBuf;

    use crate::{default_source_registry, RegistryConfig, SourceRegistry};

    /// Default configuration file names, checked in order
    pub const DEFAULT_CONFIG_FILES: &[&str] = &[
        ".ingest-sources.yaml",
        ".ingest-sources.yml",
        "ingest-sources.yaml",
        "ingest-sources.yml",
    ];

    /// `--config` and `--strict`, shared by every command that builds a registry
    pub fn registry_args() -> [Arg; 2] {
        [
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file path")
                .value_name("FILE"),
            Arg::new("strict")
                .long("strict")
                .help("Fail on registration problems instead of skipping them")
                .action(ArgAction::SetTrue),
        ]
    }

    /// Get configuration file path from arguments or the first default file that exists
    pub fn get_config_path(matches: &ArgMatches) -> Option<PathBuf> {
        if let Some(config_path) = matches.get_one::<String>("config") {
            return Some(PathBuf::from(config_path));
        }

        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Load configuration, falling back to defaults when no file is present
    pub fn load_config(matches: &ArgMatches) -> Result<RegistryConfig> {
        let mut config = match get_config_path(matches) {
            Some(path) => RegistryConfig::from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => RegistryConfig::default(),
        };

        if matches.get_flag("strict") {
            config.strict = true;
        }

        Ok(config)
    }

    /// Build the source registry described by the command line
    pub fn create_registry(matches: &ArgMatches) -> Result<SourceRegistry> {
        let config = load_config(matches)?;
        Ok(default_source_registry(&config)?)
    }
}

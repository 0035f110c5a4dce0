//! Check command implementation

use anyhow::{bail, Result};
use clap::{ArgMatches, Command};
use tracing::info;

use crate::cli::utils;

pub fn command() -> Command {
    Command::new("check")
        .about("Resolve every source type and report registration problems")
        .args(utils::registry_args())
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    info!("Checking source registry");
    let registry = utils::create_registry(matches)?;

    let entries = registry.summary_entries();
    let enabled = entries.iter().filter(|e| e.enabled).count();

    println!("{}", registry.summary(true));
    println!();
    println!("{} of {} source types can be loaded.", enabled, entries.len());

    let diagnostics = registry.diagnostics();
    if diagnostics.is_empty() {
        return Ok(());
    }

    println!();
    println!("Registration problems:");
    for diagnostic in diagnostics {
        println!("  - {} ({}): {}", diagnostic.name, diagnostic.origin, diagnostic.message);
    }

    bail!("{} registration problem(s) found", diagnostics.len())
}

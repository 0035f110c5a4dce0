//! List command implementation

use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::cli::utils;

pub fn command() -> Command {
    Command::new("list")
        .about("List registered source types and whether they can be loaded")
        .args(utils::registry_args())
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show why disabled sources cannot be loaded")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("json")
                .long("json")
                .help("Print the listing as JSON")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let registry = utils::create_registry(matches)?;

    if matches.get_flag("json") {
        let entries = registry.summary_entries();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No sources registered.");
        return Ok(());
    }

    println!("Sources:");
    for line in registry.summary(matches.get_flag("verbose")).lines() {
        println!("  {line}");
    }

    Ok(())
}

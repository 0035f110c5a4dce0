//! Info command implementation

use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::cli::utils;
use crate::SourceFactory;
use ingestion_plugin::{EntryDescription, Resolved};

pub fn command() -> Command {
    Command::new("info")
        .about("Show how a source type resolves")
        .arg(
            clap::Arg::new("TYPE")
                .help("Source type name")
                .required(true),
        )
        .args(utils::registry_args())
        .arg(
            clap::Arg::new("json")
                .long("json")
                .help("Print the entry as JSON")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let source_type = matches
        .get_one::<String>("TYPE")
        .ok_or_else(|| anyhow::anyhow!("a source type is required"))?;
    let registry = utils::create_registry(matches)?;

    let json = matches.get_flag("json");

    let Some(description) = registry.describe(source_type) else {
        // Direct references and unknown names; the latter fail with a suggestion.
        let resolved = registry.resolve(source_type)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&direct_reference_json(&resolved))?);
            return Ok(());
        }
        println!("Source type: {source_type}");
        println!("  Resolves to: {}", resolved.canonical_name);
        println!("  Platform: {}", resolved.implementation.platform());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!("Source type: {source_type}");
    match &description {
        EntryDescription::Alias {
            target,
            deprecation,
        } => {
            println!("  Alias of: {target}");
            if let Some(message) = deprecation {
                println!("  Deprecated: {message}");
            }
        }
        EntryDescription::Lazy {
            reference, origin, ..
        } => {
            println!("  Reference: {reference}");
            println!("  Declared by: {origin}");
        }
        EntryDescription::Resolved { origin } => println!("  Registered by: {origin}"),
        EntryDescription::Disabled { origin, .. } => println!("  Declared by: {origin}"),
    }

    match registry.resolve(source_type) {
        Ok(resolved) => {
            println!("  Resolves to: {}", resolved.canonical_name);
            println!("  Platform: {}", resolved.implementation.platform());
            println!("  Status: enabled");
        }
        Err(e) => {
            println!("  Status: disabled");
            println!("  Reason: {e}");
        }
    }

    Ok(())
}

/// JSON view of a lookup that bypassed the registry entries
fn direct_reference_json(resolved: &Resolved<dyn SourceFactory>) -> serde_json::Value {
    serde_json::json!({
        "kind": "direct",
        "reference": resolved.canonical_name,
        "platform": resolved.implementation.platform(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{default_source_registry, RegistryConfig};

    #[test]
    fn direct_references_have_a_json_view() {
        let config = RegistryConfig {
            include_user_manifests: false,
            ..RegistryConfig::default()
        };
        let registry = default_source_registry(&config).unwrap();
        let resolved = registry
            .resolve("ingestion.source.file.GenericFileSource")
            .unwrap();

        let json = direct_reference_json(&resolved);
        assert_eq!(json["kind"], "direct");
        assert_eq!(json["reference"], "ingestion.source.file:GenericFileSource");
        assert_eq!(json["platform"], "file");
    }
}

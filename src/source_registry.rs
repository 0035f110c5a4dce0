//! The source registry: entry-point discovery plus the source alias table

use std::sync::Arc;
use tracing::{info, warn};

use ingestion_plugin::{Diagnostic, EntryPointProvider, Loader, PluginRegistry, RegistrationPolicy};

use crate::builtin::{builtin_entry_points, builtin_symbols, BUILTIN_PROVIDER};
use crate::config::RegistryConfig;
use crate::discovery::ManifestDirectoryProvider;
use crate::source::{PipelineContext, Source, SourceConfig, SourceFactory};
use crate::IngestionResult;

/// Namespace source plugins declare their entry points under
pub const SOURCE_PLUGIN_NAMESPACE: &str = "ingestion.source.plugins";

/// Origin recorded for problems with aliases from the configuration file
pub const CONFIG_ALIAS_ORIGIN: &str = "configuration";

/// Registry of source factories keyed by source type
pub type SourceRegistry = PluginRegistry<dyn SourceFactory>;

/// Built-in aliases as `(new_name, old_name, deprecation_message)`.
///
/// Renames go here with a deprecation message. The MSSQL source has two
/// possible dependency sets; the second is aliased to the first so each
/// source type keeps a single cargo feature.
pub const SOURCE_ALIASES: &[(&str, &str, &str)] = &[("mssql-odbc", "mssql", "")];

/// Build a source registry from explicit providers and a loader.
///
/// Discovery runs first, then [`SOURCE_ALIASES`], then the configured
/// aliases. In lenient mode a bad alias is skipped with a warning.
pub fn build_source_registry(
    config: &RegistryConfig,
    loader: Arc<dyn Loader<dyn SourceFactory>>,
    providers: Vec<Arc<dyn EntryPointProvider>>,
) -> IngestionResult<SourceRegistry> {
    let mut registry = SourceRegistry::new(loader).with_policy(config.policy());
    for provider in providers {
        registry.add_provider(provider);
    }

    registry.register_from_entrypoint(&config.namespace)?;

    for &(new_name, old_name, message) in SOURCE_ALIASES {
        apply_alias(&mut registry, BUILTIN_PROVIDER, new_name, old_name, message)?;
    }
    for alias in &config.aliases {
        apply_alias(
            &mut registry,
            CONFIG_ALIAS_ORIGIN,
            &alias.name,
            &alias.target,
            &alias.deprecation,
        )?;
    }

    info!(
        "Source registry ready: {} source types, {} aliases",
        registry.names().len(),
        registry.aliases().len()
    );
    Ok(registry)
}

fn apply_alias(
    registry: &mut SourceRegistry,
    origin: &str,
    new_name: &str,
    old_name: &str,
    message: &str,
) -> IngestionResult<()> {
    match registry.register_alias(new_name, old_name, message) {
        Ok(()) => Ok(()),
        Err(e) if registry.policy() == RegistrationPolicy::Strict => Err(e.into()),
        Err(e) => {
            warn!("Skipping source alias '{}' -> '{}': {}", new_name, old_name, e);
            registry.record_diagnostic(Diagnostic {
                name: new_name.to_string(),
                origin: origin.to_string(),
                message: e.to_string(),
            });
            Ok(())
        }
    }
}

/// Build the registry for this binary: built-in connectors first, then any
/// manifests found in the configured directories.
pub fn default_source_registry(config: &RegistryConfig) -> IngestionResult<SourceRegistry> {
    let loader: Arc<dyn Loader<dyn SourceFactory>> = Arc::new(builtin_symbols()?);

    let manifests = ManifestDirectoryProvider::new(config.resolved_manifest_directories()?)
        .strict(config.strict);
    let providers: Vec<Arc<dyn EntryPointProvider>> =
        vec![Arc::new(builtin_entry_points()), Arc::new(manifests)];

    build_source_registry(config, loader, providers)
}

/// Look up `source_type` and construct a source from `config`.
pub fn create_source(
    registry: &SourceRegistry,
    source_type: &str,
    config: SourceConfig,
    ctx: &PipelineContext,
) -> IngestionResult<Box<dyn Source>> {
    let factory = registry.get(source_type)?;
    info!("Creating {} source for run {}", source_type, ctx.run_id);
    factory.create(config, ctx)
}

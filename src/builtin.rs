//! Source connectors compiled into this binary
//!
//! The entry points below are the compile-time counterpart of package
//! entry-point metadata: each declares a source type name and the reference
//! of its implementation. Connectors behind a disabled cargo feature are still
//! declared, but their symbols are gated so lookups report the missing
//! feature instead of an unknown type.

use std::sync::Arc;
use tracing::debug;

use ingestion_plugin::{StaticEntryPoints, SymbolTable};

use crate::source::{PipelineContext, Source, SourceConfig, SourceFactory};
use crate::source_registry::SOURCE_PLUGIN_NAMESPACE;
use crate::{IngestionError, IngestionResult};

/// Name of the provider for the built-in entry points
pub const BUILTIN_PROVIDER: &str = "builtin";

struct BuiltinSource {
    type_name: &'static str,
    reference: &'static str,
    platform: &'static str,
    required_keys: &'static [&'static str],
    /// Cargo feature and crate the connector needs, if optional
    gate: Option<(&'static str, &'static str)>,
}

const BUILTIN_SOURCES: &[BuiltinSource] = &[
    BuiltinSource {
        type_name: "file",
        reference: "ingestion.source.file:GenericFileSource",
        platform: "file",
        required_keys: &["path"],
        gate: None,
    },
    BuiltinSource {
        type_name: "demo-data",
        reference: "ingestion.source.demo_data:DemoDataSource",
        platform: "demo",
        required_keys: &[],
        gate: None,
    },
    BuiltinSource {
        type_name: "mssql",
        reference: "ingestion.source.sql.mssql:SqlServerSource",
        platform: "mssql",
        required_keys: &["host_port"],
        gate: Some(("mssql", "tiberius")),
    },
    BuiltinSource {
        type_name: "mysql",
        reference: "ingestion.source.sql.mysql:MySqlSource",
        platform: "mysql",
        required_keys: &["host_port"],
        gate: Some(("mysql", "mysql_async")),
    },
    BuiltinSource {
        type_name: "postgres",
        reference: "ingestion.source.sql.postgres:PostgresSource",
        platform: "postgres",
        required_keys: &["host_port"],
        gate: Some(("postgres", "tokio-postgres")),
    },
    BuiltinSource {
        type_name: "snowflake",
        reference: "ingestion.source.snowflake:SnowflakeSource",
        platform: "snowflake",
        required_keys: &["account_id"],
        gate: Some(("snowflake", "snowflake-api")),
    },
];

fn feature_enabled(feature: &str) -> bool {
    match feature {
        // Either dependency set provides the SQL Server connector.
        "mssql" => cfg!(any(feature = "mssql", feature = "mssql-odbc")),
        "mysql" => cfg!(feature = "mysql"),
        "postgres" => cfg!(feature = "postgres"),
        "snowflake" => cfg!(feature = "snowflake"),
        _ => false,
    }
}

/// Entry points for every built-in source under [`SOURCE_PLUGIN_NAMESPACE`]
pub fn builtin_entry_points() -> StaticEntryPoints {
    BUILTIN_SOURCES
        .iter()
        .fold(StaticEntryPoints::new(BUILTIN_PROVIDER), |provider, source| {
            provider.declare(SOURCE_PLUGIN_NAMESPACE, source.type_name, source.reference)
        })
}

/// Symbol table with the built-in factories, gating those whose feature is off
pub fn builtin_symbols() -> IngestionResult<SymbolTable<dyn SourceFactory>> {
    let mut table: SymbolTable<dyn SourceFactory> = SymbolTable::new();

    for source in BUILTIN_SOURCES {
        let added = match source.gate {
            Some((feature, dependency)) if !feature_enabled(feature) => {
                debug!("Source '{}' is gated behind feature '{}'", source.type_name, feature);
                table.gate(source.reference, dependency, Some(feature))
            }
            _ => {
                let factory: Arc<dyn SourceFactory> = Arc::new(ConfiguredSourceFactory {
                    platform: source.platform,
                    required_keys: source.required_keys,
                });
                table.provide(source.reference, factory)
            }
        };
        added.map_err(|e| IngestionError::Config(format!("built-in source '{}': {e}", source.type_name)))?;
    }

    Ok(table)
}

/// Factory for built-in sources: checks the configuration shape and wraps it.
#[derive(Debug, Clone)]
pub struct ConfiguredSourceFactory {
    platform: &'static str,
    required_keys: &'static [&'static str],
}

impl SourceFactory for ConfiguredSourceFactory {
    fn platform(&self) -> &str {
        self.platform
    }

    fn create(&self, config: SourceConfig, ctx: &PipelineContext) -> IngestionResult<Box<dyn Source>> {
        let config = match config {
            SourceConfig::Null => SourceConfig::Mapping(Default::default()),
            SourceConfig::Mapping(_) => config,
            _ => {
                return Err(IngestionError::Config(format!(
                    "{} source config must be a mapping",
                    self.platform
                )))
            }
        };

        let missing: Vec<&str> = self
            .required_keys
            .iter()
            .copied()
            .filter(|key| config.get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(IngestionError::Config(format!(
                "{} source config is missing required keys: {}",
                self.platform,
                missing.join(", ")
            )));
        }

        Ok(Box::new(ConfiguredSource {
            platform: self.platform.to_string(),
            config,
            run_id: ctx.run_id.clone(),
        }))
    }
}

/// A built-in source holding its validated configuration
#[derive(Debug, Clone)]
pub struct ConfiguredSource {
    platform: String,
    config: SourceConfig,
    run_id: String,
}

impl ConfiguredSource {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl Source for ConfiguredSource {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }
}

//! Ingestion Source Registry
//!
//! Maps source type names (`mssql`, `postgres`, ...) to the factories that
//! construct metadata ingestion sources. Types are discovered from entry-point
//! declarations under [`SOURCE_PLUGIN_NAMESPACE`], compiled-in ones and those in
//! `entry_points.yaml` manifests, and a small alias table keeps legacy and
//! alternative names working.
//!
//! The registry is built once at startup and shared read-only:
//!
//! ```no_run
//! use ingestion_sources::{default_source_registry, RegistryConfig};
//!
//! let registry = default_source_registry(&RegistryConfig::default())?;
//! let mssql = registry.get("mssql-odbc")?;
//! assert_eq!(mssql.platform(), "mssql");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builtin;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod source;
pub mod source_registry;

pub use config::{AliasDeclaration, RegistryConfig};
pub use discovery::ManifestDirectoryProvider;
pub use source::{PipelineContext, Source, SourceConfig, SourceFactory};
pub use source_registry::{
    build_source_registry, create_source, default_source_registry, SourceRegistry,
    CONFIG_ALIAS_ORIGIN, SOURCE_ALIASES, SOURCE_PLUGIN_NAMESPACE,
};

pub use ingestion_plugin::{LoadError, RegistryError};

/// Application error types
#[derive(thiserror::Error, Debug)]
pub enum IngestionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IngestionError {
    /// True when the source type exists but cannot be loaded in this build.
    pub fn is_unavailable_source(&self) -> bool {
        matches!(self, IngestionError::Registry(RegistryError::Resolution { .. }))
    }

    /// True when no source type of the requested name exists.
    pub fn is_unknown_source(&self) -> bool {
        matches!(self, IngestionError::Registry(RegistryError::NotFound { .. }))
    }
}

/// Result type for the main application
pub type IngestionResult<T> = Result<T, IngestionError>;

//! The `Source` capability stored in the registry

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::IngestionResult;

/// Raw, connector specific configuration block.
pub type SourceConfig = serde_yaml::Value;

/// Per-run information handed to source factories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineContext {
    /// Identifier of the ingestion run
    pub run_id: String,

    /// Whether the run only previews what would be emitted
    pub dry_run: bool,
}

impl PipelineContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            dry_run: false,
        }
    }
}

/// A connector that extracts metadata from an external system.
///
/// Extraction itself lives with the connectors; the registry only needs to
/// construct and identify them.
pub trait Source: Send + Sync {
    /// Platform the source reads from (e.g. "mssql")
    fn platform(&self) -> &str;

    /// Configuration the source was created with
    fn config(&self) -> &SourceConfig;

    /// Release any held resources
    fn close(&mut self) {}
}

impl fmt::Debug for dyn Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("platform", &self.platform())
            .finish()
    }
}

/// Constructs [`Source`] instances; this is what the registry stores.
pub trait SourceFactory: Send + Sync {
    /// Platform of the sources this factory creates
    fn platform(&self) -> &str;

    /// Create a source from its configuration block
    fn create(&self, config: SourceConfig, ctx: &PipelineContext) -> IngestionResult<Box<dyn Source>>;
}

impl fmt::Debug for dyn SourceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFactory")
            .field("platform", &self.platform())
            .finish()
    }
}

//! Entry-point declarations and the providers that enumerate them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegistryResult;

/// A `(name, reference)` pair declared under a discovery namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Plugin type name
    pub name: String,

    /// Unparsed loadable reference
    pub value: String,

    /// Where the declaration came from (provider name, manifest path)
    pub origin: String,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, value: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin: origin.into(),
        }
    }
}

/// A registration-time problem that was skipped in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Type name the problem relates to, or the provider name for
    /// problems that are not tied to one entry
    pub name: String,

    /// Provider or caller that declared the entry
    pub origin: String,

    /// Human readable description
    pub message: String,
}

/// What a provider found under one namespace.
#[derive(Debug, Clone, Default)]
pub struct Declared {
    /// Entry points in declaration order
    pub entry_points: Vec<EntryPoint>,

    /// Sources the provider could not read and skipped
    pub skipped: Vec<Diagnostic>,
}

impl From<Vec<EntryPoint>> for Declared {
    fn from(entry_points: Vec<EntryPoint>) -> Self {
        Self {
            entry_points,
            skipped: Vec::new(),
        }
    }
}

/// Enumerates externally declared entry points for a namespace.
///
/// Providers only report declarations; they never load implementations.
pub trait EntryPointProvider: Send + Sync {
    /// Provider name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Entry points declared under `namespace`, plus anything skipped on the way
    fn entry_points(&self, namespace: &str) -> RegistryResult<Declared>;
}

/// Entry points compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct StaticEntryPoints {
    name: String,
    namespaces: BTreeMap<String, Vec<(String, String)>>,
}

impl StaticEntryPoints {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: BTreeMap::new(),
        }
    }

    /// Declare `name = value` under `namespace`
    pub fn declare(mut self, namespace: &str, name: &str, value: &str) -> Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .push((name.to_string(), value.to_string()));
        self
    }
}

impl EntryPointProvider for StaticEntryPoints {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_points(&self, namespace: &str) -> RegistryResult<Declared> {
        let entry_points: Vec<EntryPoint> = self
            .namespaces
            .get(namespace)
            .map(|declared| {
                declared
                    .iter()
                    .map(|(name, value)| EntryPoint::new(name, value, &self.name))
                    .collect()
            })
            .unwrap_or_default();
        Ok(entry_points.into())
    }
}

//! Registry and loader error types

use thiserror::Error;

/// Failure to turn a loadable reference into an implementation.
///
/// Load errors are cached alongside the lazy entry that produced them, so
/// they must be cheap to clone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no symbol '{reference}' is available in this build")]
    SymbolNotFound { reference: String },

    #[error("symbol '{reference}' is provided more than once")]
    DuplicateSymbol { reference: String },

    #[error("'{reference}' requires the optional dependency '{dependency}'{}", feature_hint(.feature))]
    MissingDependency {
        reference: String,
        dependency: String,
        feature: Option<String>,
    },

    #[error("malformed plugin reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("{reason}")]
    Disabled { reason: String },
}

impl LoadError {
    /// True when the implementation exists but a dependency it needs was not built in.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, LoadError::MissingDependency { .. })
    }
}

fn feature_hint(feature: &Option<String>) -> String {
    match feature {
        Some(feature) => format!("; rebuild with `--features {feature}` to enable it"),
        None => String::new(),
    }
}

/// Errors raised by [`crate::PluginRegistry`] registration and lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("plugin type '{name}' is already registered ({existing})")]
    Conflict { name: String, existing: String },

    #[error(
        "no plugin type named '{name}' is registered{}{}",
        target_hint(.name, .missing_target),
        suggestion_hint(.suggestion)
    )]
    NotFound {
        name: String,
        /// Unregistered type an alias chain starting at `name` ended on
        missing_target: Option<String>,
        suggestion: Option<String>,
    },

    #[error("plugin type '{name}' is registered but cannot be loaded: {source}")]
    Resolution {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error("alias cycle detected: {}", .chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },

    #[error("invalid plugin type name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("entry point discovery via '{provider}' failed: {message}")]
    Discovery { provider: String, message: String },
}

fn target_hint(name: &str, missing_target: &Option<String>) -> String {
    match missing_target {
        Some(target) => format!(" (alias '{name}' points to unregistered '{target}')"),
        None => String::new(),
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(candidate) => format!(" (did you mean '{candidate}'?)"),
        None => String::new(),
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

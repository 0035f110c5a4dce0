//! Plugin registry mapping type names to loadable implementations
//!
//! Entries are populated once at startup (entry-point discovery plus explicit
//! registrations and aliases) and read many times afterwards. Lazy entries
//! load on first lookup and cache the outcome, success or failure, so repeated
//! lookups return the same `Arc` and never retry a failed load.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::entry_point::{Diagnostic, EntryPoint, EntryPointProvider};
use crate::error::{LoadError, RegistryError, RegistryResult};
use crate::loader::Loader;
use crate::reference::LoadableRef;

const SUGGESTION_THRESHOLD: f64 = 0.75;

/// How registration problems are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Skip the offending entry, log a warning and record a diagnostic
    #[default]
    Lenient,

    /// Return the first registration problem as an error
    Strict,
}

/// Outcome of one [`PluginRegistry::register_from_entrypoint`] call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub namespace: String,

    /// Names registered by this call, in discovery order
    pub registered: Vec<String>,

    /// Entries that were skipped
    pub skipped: Vec<Diagnostic>,
}

/// Result of resolving a type name.
pub struct Resolved<T: ?Sized> {
    /// The loaded implementation
    pub implementation: Arc<T>,

    /// Name of the concrete entry after following aliases
    pub canonical_name: String,

    /// Deprecation messages collected along the alias chain
    pub deprecations: Vec<String>,
}

/// Read-only view of a single registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDescription {
    Resolved {
        origin: String,
    },
    Lazy {
        reference: String,
        origin: String,
        loaded: bool,
    },
    Disabled {
        reason: String,
        origin: String,
    },
    Alias {
        target: String,
        deprecation: Option<String>,
    },
}

/// One line of [`PluginRegistry::summary_entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub name: String,

    /// Alias target, if the name is an alias
    pub alias_of: Option<String>,

    pub enabled: bool,

    /// Failure reason when not enabled
    pub reason: Option<String>,
}

enum Entry<T: ?Sized> {
    Resolved {
        implementation: Arc<T>,
        origin: String,
    },
    Lazy {
        reference: LoadableRef,
        origin: String,
        cell: OnceLock<Result<Arc<T>, LoadError>>,
    },
    Disabled {
        reason: LoadError,
        origin: String,
    },
}

impl<T: ?Sized> Entry<T> {
    fn origin(&self) -> &str {
        match self {
            Entry::Resolved { origin, .. }
            | Entry::Lazy { origin, .. }
            | Entry::Disabled { origin, .. } => origin,
        }
    }

    fn same_as(&self, other: &Entry<T>) -> bool {
        match (self, other) {
            (
                Entry::Resolved { implementation: a, .. },
                Entry::Resolved { implementation: b, .. },
            ) => Arc::ptr_eq(a, b),
            (Entry::Lazy { reference: a, .. }, Entry::Lazy { reference: b, .. }) => a == b,
            (Entry::Disabled { reason: a, .. }, Entry::Disabled { reason: b, .. }) => a == b,
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Entry::Resolved { origin, .. } => format!("registered by {origin}"),
            Entry::Lazy {
                reference, origin, ..
            } => format!("'{reference}' from {origin}"),
            Entry::Disabled { origin, .. } => format!("disabled entry from {origin}"),
        }
    }
}

struct Alias {
    target: String,
    deprecation: Option<String>,
}

/// Registry of plugin implementations of capability `T`.
pub struct PluginRegistry<T: ?Sized> {
    entries: HashMap<String, Entry<T>>,
    aliases: HashMap<String, Alias>,
    loader: Arc<dyn Loader<T>>,
    providers: Vec<Arc<dyn EntryPointProvider>>,
    policy: RegistrationPolicy,
    diagnostics: Vec<Diagnostic>,
}

impl<T: ?Sized> PluginRegistry<T> {
    /// Create an empty registry that resolves lazy entries through `loader`
    pub fn new(loader: Arc<dyn Loader<T>>) -> Self {
        Self {
            entries: HashMap::new(),
            aliases: HashMap::new(),
            loader,
            providers: Vec::new(),
            policy: RegistrationPolicy::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn EntryPointProvider>) -> Self {
        self.add_provider(provider);
        self
    }

    /// Add an entry-point provider consulted by [`Self::register_from_entrypoint`].
    ///
    /// Providers are queried in the order they were added; on duplicate names
    /// the earlier provider wins.
    pub fn add_provider(&mut self, provider: Arc<dyn EntryPointProvider>) {
        self.providers.push(provider);
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Register a resolved implementation.
    ///
    /// Registering the same `Arc` twice is a no-op; any other existing entry
    /// under `type_name` is a conflict.
    pub fn register(&mut self, type_name: &str, implementation: Arc<T>) -> RegistryResult<()> {
        validate_name(type_name)?;
        self.insert(
            type_name,
            Entry::Resolved {
                implementation,
                origin: "explicit registration".to_string(),
            },
        )
    }

    /// Register a resolved implementation, replacing whatever was there.
    pub fn register_with_override(&mut self, type_name: &str, implementation: Arc<T>) -> RegistryResult<()> {
        validate_name(type_name)?;
        if self.aliases.remove(type_name).is_some() {
            debug!("Replacing alias '{}' with a concrete registration", type_name);
        }
        let previous = self.entries.insert(
            type_name.to_string(),
            Entry::Resolved {
                implementation,
                origin: "explicit override".to_string(),
            },
        );
        if let Some(previous) = previous {
            debug!("Overriding plugin type '{}' ({})", type_name, previous.describe());
        }
        Ok(())
    }

    /// Register a reference that is loaded on first lookup.
    pub fn register_lazy(&mut self, type_name: &str, reference: &str) -> RegistryResult<()> {
        validate_name(type_name)?;
        let reference: LoadableRef = reference.parse().map_err(|source| RegistryError::Resolution {
            name: type_name.to_string(),
            source,
        })?;
        self.insert(
            type_name,
            Entry::Lazy {
                reference,
                origin: "explicit registration".to_string(),
                cell: OnceLock::new(),
            },
        )
    }

    /// Register a type that is known but cannot be used in this build.
    pub fn register_disabled(&mut self, type_name: &str, reason: impl Into<String>) -> RegistryResult<()> {
        validate_name(type_name)?;
        self.insert(
            type_name,
            Entry::Disabled {
                reason: LoadError::Disabled {
                    reason: reason.into(),
                },
                origin: "explicit registration".to_string(),
            },
        )
    }

    /// Register every entry point the configured providers declare under `namespace`.
    ///
    /// Entries become lazy. Invalid names and duplicates are skipped with a
    /// warning, and a malformed reference becomes a disabled entry whose error
    /// surfaces on lookup. Under [`RegistrationPolicy::Strict`] the first such
    /// problem is returned instead.
    pub fn register_from_entrypoint(&mut self, namespace: &str) -> RegistryResult<DiscoveryReport> {
        let mut report = DiscoveryReport {
            namespace: namespace.to_string(),
            ..Default::default()
        };

        let providers = self.providers.clone();
        for provider in providers {
            let declared = match provider.entry_points(namespace) {
                Ok(declared) => declared,
                Err(e) => {
                    self.reject(&mut report, provider.name(), provider.name(), e)?;
                    continue;
                }
            };

            debug!(
                "Provider '{}' declared {} entry points under {} ({} sources skipped)",
                provider.name(),
                declared.entry_points.len(),
                namespace,
                declared.skipped.len()
            );

            for diagnostic in declared.skipped {
                if self.policy == RegistrationPolicy::Strict {
                    return Err(RegistryError::Discovery {
                        provider: provider.name().to_string(),
                        message: diagnostic.message,
                    });
                }
                report.skipped.push(diagnostic.clone());
                self.diagnostics.push(diagnostic);
            }

            for entry_point in declared.entry_points {
                self.register_entry_point(entry_point, &mut report)?;
            }
        }

        info!(
            "Registered {} plugins from {} ({} skipped)",
            report.registered.len(),
            namespace,
            report.skipped.len()
        );
        Ok(report)
    }

    fn register_entry_point(&mut self, entry_point: EntryPoint, report: &mut DiscoveryReport) -> RegistryResult<()> {
        let EntryPoint { name, value, origin } = entry_point;

        if let Err(e) = validate_name(&name) {
            return self.reject(report, &name, &origin, e);
        }

        if let Some(existing) = self.existing_description(&name) {
            let conflict = RegistryError::Conflict {
                name: name.clone(),
                existing,
            };
            return self.reject(report, &name, &origin, conflict);
        }

        let entry = match value.parse::<LoadableRef>() {
            Ok(reference) => Entry::Lazy {
                reference,
                origin,
                cell: OnceLock::new(),
            },
            Err(reason) => {
                let error = RegistryError::Resolution {
                    name: name.clone(),
                    source: reason.clone(),
                };
                if self.policy == RegistrationPolicy::Strict {
                    return Err(error);
                }
                warn!("Entry point '{}' from {} is unusable: {}", name, origin, reason);
                self.diagnostics.push(Diagnostic {
                    name: name.clone(),
                    origin: origin.clone(),
                    message: error.to_string(),
                });
                Entry::Disabled { reason, origin }
            }
        };

        self.entries.insert(name.clone(), entry);
        report.registered.push(name);
        Ok(())
    }

    /// Make lookups of `new_name` resolve `old_name`.
    ///
    /// `old_name` does not have to be registered yet. A non-empty
    /// `deprecation_message` is logged on every lookup through `new_name`.
    pub fn register_alias(&mut self, new_name: &str, old_name: &str, deprecation_message: &str) -> RegistryResult<()> {
        validate_name(new_name)?;
        validate_name(old_name)?;

        if let Some(entry) = self.entries.get(new_name) {
            return Err(RegistryError::Conflict {
                name: new_name.to_string(),
                existing: entry.describe(),
            });
        }

        let deprecation = (!deprecation_message.is_empty()).then(|| deprecation_message.to_string());

        if let Some(existing) = self.aliases.get(new_name) {
            if existing.target != old_name {
                return Err(RegistryError::Conflict {
                    name: new_name.to_string(),
                    existing: format!("alias of '{}'", existing.target),
                });
            }
        }

        let mut chain = vec![new_name.to_string()];
        let mut current = old_name;
        loop {
            chain.push(current.to_string());
            if current == new_name {
                return Err(RegistryError::AliasCycle { chain });
            }
            match self.aliases.get(current) {
                Some(alias) => current = &alias.target,
                None => break,
            }
        }

        self.aliases.insert(
            new_name.to_string(),
            Alias {
                target: old_name.to_string(),
                deprecation,
            },
        );
        Ok(())
    }

    /// Resolve `type_name` to an implementation, logging any deprecation notices.
    pub fn get(&self, type_name: &str) -> RegistryResult<Arc<T>> {
        let resolved = self.resolve(type_name)?;
        for message in &resolved.deprecations {
            warn!("Plugin type '{}' is deprecated: {}", type_name, message);
        }
        Ok(resolved.implementation)
    }

    /// Resolve `type_name` through aliases and lazy loading.
    ///
    /// Unregistered keys that look like a loadable reference
    /// (`pkg.module:Symbol`) are loaded directly.
    pub fn resolve(&self, type_name: &str) -> RegistryResult<Resolved<T>> {
        if !self.entries.contains_key(type_name)
            && !self.aliases.contains_key(type_name)
            && LoadableRef::looks_like_reference(type_name)
        {
            return self.resolve_reference(type_name);
        }

        let mut deprecations = Vec::new();
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = type_name;

        while let Some(alias) = self.aliases.get(current) {
            chain.push(current.to_string());
            if !visited.insert(current) {
                return Err(RegistryError::AliasCycle { chain });
            }
            if let Some(message) = &alias.deprecation {
                deprecations.push(message.clone());
            }
            current = &alias.target;
        }

        let entry = self.entries.get(current).ok_or_else(|| RegistryError::NotFound {
            name: type_name.to_string(),
            missing_target: (current != type_name).then(|| current.to_string()),
            suggestion: self.suggest(type_name, &chain),
        })?;

        let implementation = match entry {
            Entry::Resolved { implementation, .. } => Arc::clone(implementation),
            Entry::Lazy { reference, cell, .. } => cell
                .get_or_init(|| {
                    debug!("Loading plugin type '{}' from {}", current, reference);
                    self.loader.load(reference)
                })
                .clone()
                .map_err(|source| RegistryError::Resolution {
                    name: current.to_string(),
                    source,
                })?,
            Entry::Disabled { reason, .. } => {
                return Err(RegistryError::Resolution {
                    name: current.to_string(),
                    source: reason.clone(),
                })
            }
        };

        Ok(Resolved {
            implementation,
            canonical_name: current.to_string(),
            deprecations,
        })
    }

    fn resolve_reference(&self, raw: &str) -> RegistryResult<Resolved<T>> {
        let to_error = |source| RegistryError::Resolution {
            name: raw.to_string(),
            source,
        };
        let reference: LoadableRef = raw.parse().map_err(to_error)?;
        let implementation = self.loader.load(&reference).map_err(to_error)?;
        Ok(Resolved {
            implementation,
            canonical_name: reference.canonical(),
            deprecations: Vec::new(),
        })
    }

    /// Whether `type_name` names an entry, or an alias chain ending in one.
    ///
    /// Never loads anything.
    pub fn is_registered(&self, type_name: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = type_name;
        while let Some(alias) = self.aliases.get(current) {
            if !visited.insert(current) {
                return false;
            }
            current = &alias.target;
        }
        self.entries.contains_key(current)
    }

    /// Whether `type_name` resolves successfully. Forces loading.
    pub fn is_enabled(&self, type_name: &str) -> bool {
        self.resolve(type_name).is_ok()
    }

    /// Describe the entry or alias stored under `type_name` without loading it
    pub fn describe(&self, type_name: &str) -> Option<EntryDescription> {
        if let Some(alias) = self.aliases.get(type_name) {
            return Some(EntryDescription::Alias {
                target: alias.target.clone(),
                deprecation: alias.deprecation.clone(),
            });
        }

        self.entries.get(type_name).map(|entry| match entry {
            Entry::Resolved { origin, .. } => EntryDescription::Resolved {
                origin: origin.clone(),
            },
            Entry::Lazy {
                reference,
                origin,
                cell,
            } => EntryDescription::Lazy {
                reference: reference.canonical(),
                origin: origin.clone(),
                loaded: cell.get().is_some(),
            },
            Entry::Disabled { reason, origin } => EntryDescription::Disabled {
                reason: reason.to_string(),
                origin: origin.clone(),
            },
        })
    }

    /// Concrete (non-alias) type names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(alias, target)` pairs, sorted by alias
    pub fn aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(name, alias)| (name.clone(), alias.target.clone()))
            .collect();
        aliases.sort();
        aliases
    }

    /// Resolve every entry and alias and report whether it is usable.
    pub fn summary_entries(&self) -> Vec<PluginSummary> {
        let names: BTreeSet<&String> = self.entries.keys().chain(self.aliases.keys()).collect();

        names
            .into_iter()
            .map(|name| {
                let result = self.resolve(name);
                PluginSummary {
                    name: name.clone(),
                    alias_of: self.aliases.get(name).map(|alias| alias.target.clone()),
                    enabled: result.is_ok(),
                    reason: result.err().map(|e| e.to_string()),
                }
            })
            .collect()
    }

    /// Human readable listing of all plugins with their enabled state.
    pub fn summary(&self, verbose: bool) -> String {
        let entries = self.summary_entries();
        let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            let status = if entry.enabled { "enabled" } else { "disabled" };
            let mut line = match &entry.alias_of {
                Some(target) => format!("{:<width$} ({status}, alias of {target})", entry.name),
                None => format!("{:<width$} ({status})", entry.name),
            };
            if verbose {
                if let Some(reason) = &entry.reason {
                    line.push_str(&format!("\n{:<width$}   {reason}", ""));
                }
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Registration problems recorded so far in lenient mode
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Record a problem the caller skipped while populating the registry,
    /// such as an alias it chose not to apply.
    pub fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.aliases.is_empty()
    }

    fn insert(&mut self, type_name: &str, entry: Entry<T>) -> RegistryResult<()> {
        if let Some(alias) = self.aliases.get(type_name) {
            return Err(RegistryError::Conflict {
                name: type_name.to_string(),
                existing: format!("alias of '{}'", alias.target),
            });
        }

        if let Some(existing) = self.entries.get(type_name) {
            if existing.same_as(&entry) {
                return Ok(());
            }
            return Err(RegistryError::Conflict {
                name: type_name.to_string(),
                existing: existing.describe(),
            });
        }

        debug!("Registered plugin type '{}' ({})", type_name, entry.origin());
        self.entries.insert(type_name.to_string(), entry);
        Ok(())
    }

    fn existing_description(&self, type_name: &str) -> Option<String> {
        if let Some(alias) = self.aliases.get(type_name) {
            return Some(format!("alias of '{}'", alias.target));
        }
        self.entries.get(type_name).map(Entry::describe)
    }

    fn reject(
        &mut self,
        report: &mut DiscoveryReport,
        name: &str,
        origin: &str,
        error: RegistryError,
    ) -> RegistryResult<()> {
        if self.policy == RegistrationPolicy::Strict {
            return Err(error);
        }

        warn!("Skipping plugin '{}' from {}: {}", name, origin, error);
        let diagnostic = Diagnostic {
            name: name.to_string(),
            origin: origin.to_string(),
            message: error.to_string(),
        };
        report.skipped.push(diagnostic.clone());
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    /// Closest known name to `unknown`, ignoring the aliases already followed.
    fn suggest(&self, unknown: &str, followed: &[String]) -> Option<String> {
        let mut best_score = SUGGESTION_THRESHOLD;
        let mut best_match = None;

        for candidate in self.entries.keys().chain(self.aliases.keys()) {
            if followed.contains(candidate) {
                continue;
            }
            let score = strsim::jaro_winkler(unknown, candidate);
            if score > best_score {
                best_score = score;
                best_match = Some(candidate.clone());
            }
        }

        best_match
    }
}

impl<T: ?Sized> fmt::Debug for PluginRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("entries", &self.names())
            .field("aliases", &self.aliases())
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Type names are non-empty, free of whitespace, and may not contain `.` or
/// `:`, which mark direct loadable references.
pub fn validate_name(name: &str) -> RegistryResult<()> {
    let invalid = |reason: &str| RegistryError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("name must not contain whitespace"));
    }
    if name.contains('.') || name.contains(':') {
        return Err(invalid("'.' and ':' are reserved for direct references"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_point::{Declared, StaticEntryPoints};
    use crate::loader::SymbolTable;

    const NS: &str = "test.plugins";

    fn loader() -> Arc<SymbolTable<str>> {
        let mut table = SymbolTable::new();
        table.provide("pkg.mssql:SqlServer", Arc::from("sql-server")).unwrap();
        table.provide("pkg.mysql:MySql", Arc::from("mysql")).unwrap();
        table
            .gate("pkg.odbc:Odbc", "odbc-api", Some("odbc"))
            .unwrap();
        Arc::new(table)
    }

    fn registry() -> PluginRegistry<str> {
        PluginRegistry::new(loader())
    }

    #[test]
    fn register_and_get() {
        let mut registry = registry();
        let implementation: Arc<str> = Arc::from("demo");
        registry.register("demo", Arc::clone(&implementation)).unwrap();

        let found = registry.get("demo").unwrap();
        assert!(Arc::ptr_eq(&found, &implementation));
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let mut registry = registry();
        registry.register("demo", Arc::from("one")).unwrap();

        let err = registry.register("demo", Arc::from("two")).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
        assert_eq!(&*registry.get("demo").unwrap(), "one");
    }

    #[test]
    fn same_implementation_twice_is_a_noop() {
        let mut registry = registry();
        let implementation: Arc<str> = Arc::from("demo");
        registry.register("demo", Arc::clone(&implementation)).unwrap();
        registry.register("demo", implementation).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn override_replaces_entry() {
        let mut registry = registry();
        registry.register("demo", Arc::from("one")).unwrap();
        registry.register_with_override("demo", Arc::from("two")).unwrap();
        assert_eq!(&*registry.get("demo").unwrap(), "two");
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut registry = registry();
        for name in ["", "has space", "dotted.name", "colon:name"] {
            let err = registry.register(name, Arc::from("x")).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidName { .. }), "{name}");
        }
    }

    #[test]
    fn lazy_entries_resolve_once() {
        let mut registry = registry();
        registry.register_lazy("mssql", "pkg.mssql:SqlServer").unwrap();

        assert!(matches!(
            registry.describe("mssql"),
            Some(EntryDescription::Lazy { loaded: false, .. })
        ));

        let first = registry.get("mssql").unwrap();
        let second = registry.get("mssql").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(
            registry.describe("mssql"),
            Some(EntryDescription::Lazy { loaded: true, .. })
        ));
    }

    #[test]
    fn alias_resolves_to_target() {
        let mut registry = registry();
        registry.register_lazy("mssql", "pkg.mssql:SqlServer").unwrap();
        registry.register_alias("mssql-odbc", "mssql", "").unwrap();

        let via_alias = registry.resolve("mssql-odbc").unwrap();
        assert_eq!(via_alias.canonical_name, "mssql");
        assert!(via_alias.deprecations.is_empty());
        assert!(Arc::ptr_eq(
            &via_alias.implementation,
            &registry.get("mssql").unwrap()
        ));
    }

    #[test]
    fn alias_before_target_is_deferred() {
        let mut registry = registry();
        registry.register_alias("new-name", "old-name", "").unwrap();
        assert!(!registry.is_registered("new-name"));
        assert!(matches!(
            registry.get("new-name"),
            Err(RegistryError::NotFound { .. })
        ));

        registry.register("old-name", Arc::from("impl")).unwrap();
        assert!(registry.is_registered("new-name"));
        assert_eq!(&*registry.get("new-name").unwrap(), "impl");
    }

    #[test]
    fn dangling_alias_names_the_requested_type_and_missing_target() {
        let mut registry = registry();
        registry.register("acme-v2", Arc::from("impl")).unwrap();
        registry.register_alias("acme-legacy", "acme", "").unwrap();

        let err = registry.get("acme-legacy").unwrap_err();
        let message = err.to_string();
        match err {
            RegistryError::NotFound {
                name,
                missing_target,
                suggestion,
            } => {
                assert_eq!(name, "acme-legacy");
                assert_eq!(missing_target.as_deref(), Some("acme"));
                assert_ne!(suggestion.as_deref(), Some("acme-legacy"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(message.contains("alias 'acme-legacy' points to unregistered 'acme'"));
    }

    #[test]
    fn deprecation_messages_are_collected_along_the_chain() {
        let mut registry = registry();
        registry.register("current", Arc::from("impl")).unwrap();
        registry
            .register_alias("renamed", "current", "use 'current' instead")
            .unwrap();
        registry
            .register_alias("ancient", "renamed", "use 'current' instead of 'ancient'")
            .unwrap();

        let resolved = registry.resolve("ancient").unwrap();
        assert_eq!(resolved.canonical_name, "current");
        assert_eq!(
            resolved.deprecations,
            vec![
                "use 'current' instead of 'ancient'".to_string(),
                "use 'current' instead".to_string()
            ]
        );
        assert!(registry.resolve("current").unwrap().deprecations.is_empty());
    }

    #[test]
    fn alias_cycles_are_rejected() {
        let mut registry = registry();
        registry.register_alias("a", "b", "").unwrap();
        registry.register_alias("b", "c", "").unwrap();

        let err = registry.register_alias("c", "a", "").unwrap_err();
        match err {
            RegistryError::AliasCycle { chain } => assert_eq!(chain, vec!["c", "a", "b", "c"]),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            registry.register_alias("self", "self", ""),
            Err(RegistryError::AliasCycle { .. })
        ));
    }

    #[test]
    fn alias_conflicts() {
        let mut registry = registry();
        registry.register("mssql", Arc::from("impl")).unwrap();
        registry.register("mysql", Arc::from("impl")).unwrap();

        assert!(matches!(
            registry.register_alias("mssql", "mysql", ""),
            Err(RegistryError::Conflict { .. })
        ));

        registry.register_alias("odbc", "mssql", "").unwrap();
        registry.register_alias("odbc", "mssql", "").unwrap();
        assert!(matches!(
            registry.register_alias("odbc", "mysql", ""),
            Err(RegistryError::Conflict { .. })
        ));
        assert!(matches!(
            registry.register("odbc", Arc::from("impl")),
            Err(RegistryError::Conflict { .. })
        ));
    }

    #[test]
    fn unknown_names_suggest_close_matches() {
        let mut registry = registry();
        registry.register("postgres", Arc::from("impl")).unwrap();

        match registry.get("postgress").unwrap_err() {
            RegistryError::NotFound {
                name,
                missing_target,
                suggestion,
            } => {
                assert_eq!(name, "postgress");
                assert!(missing_target.is_none());
                assert_eq!(suggestion.as_deref(), Some("postgres"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match registry.get("zzz").unwrap_err() {
            RegistryError::NotFound { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_dependency_is_distinguished_from_unknown_type() {
        let mut registry = registry();
        registry.register_lazy("odbc", "pkg.odbc:Odbc").unwrap();

        assert!(registry.is_registered("odbc"));
        match registry.get("odbc").unwrap_err() {
            RegistryError::Resolution { name, source } => {
                assert_eq!(name, "odbc");
                assert!(source.is_missing_dependency());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!registry.is_enabled("odbc"));
    }

    #[test]
    fn is_registered_does_not_load() {
        let mut registry = registry();
        registry.register_lazy("missing", "pkg.nowhere:Missing").unwrap();

        assert!(registry.is_registered("missing"));
        assert!(matches!(
            registry.describe("missing"),
            Some(EntryDescription::Lazy { loaded: false, .. })
        ));
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::Resolution {
                source: LoadError::SymbolNotFound { .. },
                ..
            })
        ));
    }

    #[test]
    fn disabled_entries_fail_on_lookup() {
        let mut registry = registry();
        registry
            .register_disabled("legacy", "legacy connector was removed")
            .unwrap();

        assert!(registry.is_registered("legacy"));
        let err = registry.get("legacy").unwrap_err();
        assert!(err.to_string().contains("legacy connector was removed"));
    }

    #[test]
    fn direct_references_bypass_the_table() {
        let registry = registry();
        assert_eq!(&*registry.get("pkg.mysql:MySql").unwrap(), "mysql");
        assert_eq!(&*registry.get("pkg.mysql.MySql").unwrap(), "mysql");
        assert!(!registry.is_registered("pkg.mysql:MySql"));
    }

    #[test]
    fn entrypoint_discovery_registers_lazy_entries() {
        let provider = StaticEntryPoints::new("builtin")
            .declare(NS, "mssql", "pkg.mssql:SqlServer")
            .declare(NS, "mysql", "pkg.mysql:MySql")
            .declare("other.plugins", "ignored", "pkg.other:Other");
        let mut registry = registry().with_provider(Arc::new(provider));

        let report = registry.register_from_entrypoint(NS).unwrap();
        assert_eq!(report.registered, vec!["mssql", "mysql"]);
        assert!(report.skipped.is_empty());
        assert_eq!(registry.names(), vec!["mssql", "mysql"]);
        assert!(!registry.is_registered("ignored"));
    }

    #[test]
    fn lenient_discovery_keeps_first_duplicate() {
        let first = StaticEntryPoints::new("first").declare(NS, "mssql", "pkg.mssql:SqlServer");
        let second = StaticEntryPoints::new("second").declare(NS, "mssql", "pkg.mysql:MySql");
        let mut registry = registry()
            .with_provider(Arc::new(first))
            .with_provider(Arc::new(second));

        let report = registry.register_from_entrypoint(NS).unwrap();
        assert_eq!(report.registered, vec!["mssql"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].origin, "second");
        assert!(report.skipped[0].message.contains("first"));
        assert_eq!(registry.diagnostics().len(), 1);
        assert_eq!(&*registry.get("mssql").unwrap(), "sql-server");
    }

    #[test]
    fn strict_discovery_fails_on_duplicate() {
        let first = StaticEntryPoints::new("first").declare(NS, "mssql", "pkg.mssql:SqlServer");
        let second = StaticEntryPoints::new("second").declare(NS, "mssql", "pkg.mysql:MySql");
        let mut registry = registry()
            .with_policy(RegistrationPolicy::Strict)
            .with_provider(Arc::new(first))
            .with_provider(Arc::new(second));

        let err = registry.register_from_entrypoint(NS).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
    }

    #[test]
    fn malformed_reference_surfaces_at_lookup() {
        let provider = StaticEntryPoints::new("builtin")
            .declare(NS, "broken", "not a reference")
            .declare(NS, "bad.name", "pkg.mysql:MySql");
        let mut registry = registry().with_provider(Arc::new(provider));

        let report = registry.register_from_entrypoint(NS).unwrap();
        assert_eq!(report.registered, vec!["broken"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "bad.name");
        assert_eq!(registry.diagnostics().len(), 2);

        assert!(registry.is_registered("broken"));
        assert!(matches!(
            registry.get("broken"),
            Err(RegistryError::Resolution {
                source: LoadError::MalformedReference { .. },
                ..
            })
        ));
    }

    #[test]
    fn strict_discovery_fails_on_malformed_reference() {
        let provider = StaticEntryPoints::new("builtin").declare(NS, "broken", "nope");
        let mut registry = registry()
            .with_policy(RegistrationPolicy::Strict)
            .with_provider(Arc::new(provider));

        assert!(matches!(
            registry.register_from_entrypoint(NS),
            Err(RegistryError::Resolution { .. })
        ));
    }

    struct PartialProvider;

    impl EntryPointProvider for PartialProvider {
        fn name(&self) -> &str {
            "partial"
        }

        fn entry_points(&self, namespace: &str) -> RegistryResult<Declared> {
            Ok(Declared {
                entry_points: vec![EntryPoint::new("mysql", "pkg.mysql:MySql", "partial/ok.yaml")],
                skipped: vec![Diagnostic {
                    name: "partial".to_string(),
                    origin: "partial/broken.yaml".to_string(),
                    message: format!("unreadable declarations for {namespace}"),
                }],
            })
        }
    }

    #[test]
    fn provider_skips_become_diagnostics() {
        let mut registry = registry().with_provider(Arc::new(PartialProvider));

        let report = registry.register_from_entrypoint(NS).unwrap();
        assert_eq!(report.registered, vec!["mysql"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(registry.diagnostics().len(), 1);
        assert_eq!(registry.diagnostics()[0].origin, "partial/broken.yaml");
    }

    #[test]
    fn strict_discovery_fails_on_provider_skips() {
        let mut registry = registry()
            .with_policy(RegistrationPolicy::Strict)
            .with_provider(Arc::new(PartialProvider));

        assert!(matches!(
            registry.register_from_entrypoint(NS),
            Err(RegistryError::Discovery { .. })
        ));
    }

    #[test]
    fn recorded_diagnostics_are_kept() {
        let mut registry = registry();
        registry.record_diagnostic(Diagnostic {
            name: "odbc".to_string(),
            origin: "config".to_string(),
            message: "alias skipped".to_string(),
        });
        assert_eq!(registry.diagnostics().len(), 1);
        assert_eq!(registry.diagnostics()[0].name, "odbc");
    }

    #[test]
    fn summary_lists_status() {
        let mut registry = registry();
        registry.register_lazy("mssql", "pkg.mssql:SqlServer").unwrap();
        registry.register_lazy("odbc", "pkg.odbc:Odbc").unwrap();
        registry.register_alias("mssql-odbc", "mssql", "").unwrap();

        let entries = registry.summary_entries();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["mssql", "mssql-odbc", "odbc"]);
        assert!(entries[0].enabled);
        assert_eq!(entries[1].alias_of.as_deref(), Some("mssql"));
        assert!(!entries[2].enabled);

        let summary = registry.summary(false);
        assert!(summary.contains("mssql      (enabled)"));
        assert!(summary.contains("(enabled, alias of mssql)"));
        assert!(!summary.contains("odbc-api"));
        assert!(registry.summary(true).contains("odbc-api"));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        let mut registry = registry();
        registry.register_lazy("mssql", "pkg.mssql:SqlServer").unwrap();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get("mssql").unwrap())
            })
            .collect();
        let loaded: Vec<Arc<str>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}

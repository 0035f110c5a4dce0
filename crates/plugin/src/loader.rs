//! Resolution of loadable references into implementations

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::LoadError;
use crate::reference::LoadableRef;

/// Turns a [`LoadableRef`] into a shared implementation of `T`.
///
/// There is no dynamic import in a compiled binary, so implementations are
/// expected to come from a table assembled at build time (see [`SymbolTable`])
/// or from a host that knows how to open shared objects.
pub trait Loader<T: ?Sized>: Send + Sync {
    /// Load the implementation behind `reference`
    fn load(&self, reference: &LoadableRef) -> Result<Arc<T>, LoadError>;
}

enum Symbol<T: ?Sized> {
    Available(Arc<T>),
    Gated {
        dependency: String,
        feature: Option<String>,
    },
}

/// Static symbol table keyed by canonical `module:Symbol` references.
///
/// Symbols whose optional dependency was compiled out are recorded as gated,
/// so a lookup can tell "unknown symbol" apart from "known but not built".
pub struct SymbolTable<T: ?Sized> {
    symbols: HashMap<String, Symbol<T>>,
}

impl<T: ?Sized> SymbolTable<T> {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    /// Make `implementation` available under `reference`.
    ///
    /// Each reference may be provided or gated only once.
    pub fn provide(&mut self, reference: &str, implementation: Arc<T>) -> Result<&mut Self, LoadError> {
        self.insert(reference, Symbol::Available(implementation))
    }

    /// Record `reference` as existing but needing `dependency`, optionally enabled by a cargo `feature`.
    pub fn gate(
        &mut self,
        reference: &str,
        dependency: impl Into<String>,
        feature: Option<&str>,
    ) -> Result<&mut Self, LoadError> {
        self.insert(
            reference,
            Symbol::Gated {
                dependency: dependency.into(),
                feature: feature.map(str::to_string),
            },
        )
    }

    fn insert(&mut self, reference: &str, symbol: Symbol<T>) -> Result<&mut Self, LoadError> {
        let key = reference.parse::<LoadableRef>()?.canonical();
        if self.symbols.contains_key(&key) {
            return Err(LoadError::DuplicateSymbol { reference: key });
        }
        self.symbols.insert(key, symbol);
        Ok(self)
    }

    pub fn contains(&self, reference: &LoadableRef) -> bool {
        self.symbols.contains_key(&reference.canonical())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<T: ?Sized> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync> Loader<T> for SymbolTable<T> {
    fn load(&self, reference: &LoadableRef) -> Result<Arc<T>, LoadError> {
        match self.symbols.get(&reference.canonical()) {
            Some(Symbol::Available(implementation)) => Ok(Arc::clone(implementation)),
            Some(Symbol::Gated {
                dependency,
                feature,
            }) => Err(LoadError::MissingDependency {
                reference: reference.canonical(),
                dependency: dependency.clone(),
                feature: feature.clone(),
            }),
            None => Err(LoadError::SymbolNotFound {
                reference: reference.canonical(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_provided_symbols() {
        let mut table: SymbolTable<str> = SymbolTable::new();
        table.provide("pkg.sources:Demo", Arc::from("demo")).unwrap();

        let reference: LoadableRef = "pkg.sources.Demo".parse().unwrap();
        assert_eq!(&*table.load(&reference).unwrap(), "demo");
        assert!(table.contains(&reference));
    }

    #[test]
    fn gated_symbols_report_missing_dependency() {
        let mut table: SymbolTable<str> = SymbolTable::new();
        table
            .gate("pkg.sources:Odbc", "odbc-api", Some("mssql-odbc"))
            .unwrap();

        let reference: LoadableRef = "pkg.sources:Odbc".parse().unwrap();
        let err = table.load(&reference).unwrap_err();
        assert!(err.is_missing_dependency());
        assert!(err.to_string().contains("--features mssql-odbc"));
    }

    #[test]
    fn symbols_cannot_be_shadowed() {
        let mut table: SymbolTable<str> = SymbolTable::new();
        table.provide("pkg.sources:Demo", Arc::from("demo")).unwrap();

        assert!(matches!(
            table.provide("pkg.sources.Demo", Arc::from("other")),
            Err(LoadError::DuplicateSymbol { .. })
        ));
        assert!(matches!(
            table.gate("pkg.sources:Demo", "demo-dep", None),
            Err(LoadError::DuplicateSymbol { .. })
        ));

        let reference: LoadableRef = "pkg.sources:Demo".parse().unwrap();
        assert_eq!(&*table.load(&reference).unwrap(), "demo");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unknown_symbols_are_not_found() {
        let table: SymbolTable<str> = SymbolTable::new();
        let reference: LoadableRef = "pkg.sources:Nope".parse().unwrap();
        assert!(matches!(
            table.load(&reference),
            Err(LoadError::SymbolNotFound { .. })
        ));
    }
}

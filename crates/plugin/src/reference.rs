//! Loadable references of the form `module.path:Symbol`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;

/// An unresolved pointer to an implementation: a module path plus a symbol name.
///
/// Both `pkg.module:Symbol` and the dotted shorthand `pkg.module.Symbol` are
/// accepted; the last dotted segment is taken as the symbol in the latter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoadableRef {
    module: String,
    symbol: String,
}

impl LoadableRef {
    /// Create a reference from already separated parts
    pub fn new(module: impl Into<String>, symbol: impl Into<String>) -> Result<Self, LoadError> {
        let module = module.into();
        let symbol = symbol.into();
        let raw = format!("{module}:{symbol}");

        if module.is_empty() {
            return Err(malformed(&raw, "module path is empty"));
        }
        if symbol.is_empty() {
            return Err(malformed(&raw, "symbol name is empty"));
        }
        if let Some(bad) = module.split('.').find(|segment| !is_identifier(segment)) {
            return Err(malformed(&raw, &format!("invalid module segment '{bad}'")));
        }
        if !is_identifier(&symbol) {
            return Err(malformed(&raw, &format!("invalid symbol '{symbol}'")));
        }

        Ok(Self { module, symbol })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Canonical `module:Symbol` form, used as the symbol table key.
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.module, self.symbol)
    }

    /// Whether a registry key should be read as a direct reference rather than a type name.
    pub fn looks_like_reference(key: &str) -> bool {
        key.contains(':') || key.contains('.')
    }
}

impl FromStr for LoadableRef {
    type Err = LoadError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        match raw.split_once(':') {
            Some((module, symbol)) => {
                if symbol.contains(':') {
                    return Err(malformed(raw, "more than one ':' separator"));
                }
                Self::new(module, symbol)
            }
            None => match raw.rsplit_once('.') {
                Some((module, symbol)) => Self::new(module, symbol),
                None => Err(malformed(raw, "expected 'module.path:Symbol'")),
            },
        }
    }
}

impl TryFrom<String> for LoadableRef {
    type Error = LoadError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<LoadableRef> for String {
    fn from(reference: LoadableRef) -> Self {
        reference.canonical()
    }
}

impl fmt::Display for LoadableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.symbol)
    }
}

fn malformed(raw: &str, reason: &str) -> LoadError {
    LoadError::MalformedReference {
        reference: raw.to_string(),
        reason: reason.to_string(),
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

//! User supplied alias declarations

use serde::{Deserialize, Serialize};

/// An extra `name -> target` alias applied after the built-in alias table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDeclaration {
    /// Name that callers may use
    pub name: String,

    /// Registered source type it resolves to
    pub target: String,

    /// Deprecation notice logged on lookup; empty for a plain alias
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deprecation: String,
}

impl AliasDeclaration {
    pub fn new(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            deprecation: String::new(),
        }
    }

    pub fn deprecated(name: &str, target: &str, message: &str) -> Self {
        Self {
            deprecation: message.to_string(),
            ..Self::new(name, target)
        }
    }
}

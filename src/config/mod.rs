//! Configuration management for the source registry

pub mod aliases;
pub mod config;


// Re-export main types for convenience
pub use aliases::AliasDeclaration;
pub use config::RegistryConfig;

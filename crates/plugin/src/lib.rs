//! Common plugin registry infrastructure
//!
//! A [`PluginRegistry`] maps short type names to implementations of some
//! capability `T`. Entries come from entry-point providers (bulk discovery
//! under a namespace), explicit registrations, and aliases. Lazy entries are
//! resolved through a [`Loader`] on first lookup.

pub mod entry_point;
pub mod error;
pub mod loader;
pub mod reference;
pub mod registry;

pub use entry_point::{Declared, Diagnostic, EntryPoint, EntryPointProvider, StaticEntryPoints};
pub use error::{LoadError, RegistryError, RegistryResult};
pub use loader::{Loader, SymbolTable};
pub use reference::LoadableRef;
pub use registry::{
    validate_name, DiscoveryReport, EntryDescription, PluginRegistry, PluginSummary,
    RegistrationPolicy, Resolved,
};

//! Main configuration structure and implementation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ingestion_plugin::{validate_name, RegistrationPolicy};

use super::AliasDeclaration;
use crate::source_registry::SOURCE_PLUGIN_NAMESPACE;
use crate::{IngestionError, IngestionResult};

const CONFIG_VERSION: &str = "1.0";

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Configuration version
    pub version: String,

    /// Fail on registration problems instead of skipping the entry
    #[serde(default)]
    pub strict: bool,

    /// Entry-point namespace to discover sources under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directories scanned for `entry_points.yaml` manifests
    #[serde(default)]
    pub manifest_directories: Vec<PathBuf>,

    /// Also scan the per-user plugin directory
    #[serde(default = "default_true")]
    pub include_user_manifests: bool,

    /// Aliases applied after the built-in alias table
    #[serde(default)]
    pub aliases: Vec<AliasDeclaration>,
}

fn default_namespace() -> String {
    SOURCE_PLUGIN_NAMESPACE.to_string()
}

fn default_true() -> bool {
    true
}

impl RegistryConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> IngestionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RegistryConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> IngestionResult<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> IngestionResult<()> {
        if self.version != CONFIG_VERSION {
            return Err(IngestionError::Config(format!(
                "Unsupported configuration version: {}",
                self.version
            )));
        }

        if self.namespace.trim().is_empty() {
            return Err(IngestionError::Config(
                "namespace must not be empty".to_string(),
            ));
        }

        for alias in &self.aliases {
            validate_name(&alias.name)
                .and_then(|_| validate_name(&alias.target))
                .map_err(|e| IngestionError::Config(format!("alias '{}': {e}", alias.name)))?;
        }

        Ok(())
    }

    pub fn policy(&self) -> RegistrationPolicy {
        if self.strict {
            RegistrationPolicy::Strict
        } else {
            RegistrationPolicy::Lenient
        }
    }

    /// Manifest directories with `~` and environment variables expanded,
    /// followed by the per-user directory when enabled.
    pub fn resolved_manifest_directories(&self) -> IngestionResult<Vec<PathBuf>> {
        let mut directories = Vec::with_capacity(self.manifest_directories.len() + 1);

        for dir in &self.manifest_directories {
            directories.push(expand_directory(dir)?);
        }

        if self.include_user_manifests {
            if let Some(user_dir) = user_manifest_directory() {
                directories.push(user_dir);
            }
        }

        Ok(directories)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            strict: false,
            namespace: default_namespace(),
            manifest_directories: Vec::new(),
            include_user_manifests: true,
            aliases: Vec::new(),
        }
    }
}

/// Per-user manifest directory, e.g. `~/.config/ingestion-sources/plugins`
pub fn user_manifest_directory() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ingestion-sources").join("plugins"))
}

/// Expand `~` and `$VAR` references in a configured directory
pub fn expand_directory(path: &Path) -> IngestionResult<PathBuf> {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::full(&path_str).map_err(|e| {
        IngestionError::Config(format!("Failed to expand directory {path_str}: {e}"))
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

//! Entry-point discovery from manifest files on disk
//!
//! External packages declare sources by dropping an `entry_points.yaml`
//! into a scanned directory:
//!
//! ```yaml
//! ingestion.source.plugins:
//!   my-source: my_crate.sources:MySource
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use ingestion_plugin::{
    Declared, Diagnostic, EntryPoint, EntryPointProvider, RegistryError, RegistryResult,
};

/// Manifest file names recognised while scanning
pub const MANIFEST_FILE_NAMES: &[&str] = &["entry_points.yaml", "entry_points.yml"];

/// Provider reading entry points from manifest files under a set of directories.
#[derive(Debug, Clone)]
pub struct ManifestDirectoryProvider {
    directories: Vec<PathBuf>,
    strict: bool,
}

impl ManifestDirectoryProvider {
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            strict: false,
        }
    }

    /// Fail on unreadable manifests instead of skipping them
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// All manifest files under the configured directories, in a stable order
    pub fn manifest_files(&self) -> Vec<PathBuf> {
        let mut manifests = Vec::new();

        for dir in &self.directories {
            if !dir.exists() {
                debug!("Manifest directory does not exist, skipping: {:?}", dir);
                continue;
            }

            info!("Scanning manifest directory: {:?}", dir);
            for entry in WalkDir::new(dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let is_manifest = entry
                    .path()
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| MANIFEST_FILE_NAMES.contains(&name));
                if is_manifest {
                    manifests.push(entry.into_path());
                }
            }
        }

        manifests
    }

    fn read_manifest(&self, path: &Path, namespace: &str) -> RegistryResult<Vec<EntryPoint>> {
        let discovery_error = |message: String| RegistryError::Discovery {
            provider: self.name().to_string(),
            message: format!("{}: {message}", path.display()),
        };

        let content = std::fs::read_to_string(path).map_err(|e| discovery_error(e.to_string()))?;
        parse_manifest(&content, namespace, &path.display().to_string()).map_err(discovery_error)
    }
}

impl EntryPointProvider for ManifestDirectoryProvider {
    fn name(&self) -> &str {
        "manifest-directories"
    }

    fn entry_points(&self, namespace: &str) -> RegistryResult<Declared> {
        let mut declared = Declared::default();

        for manifest in self.manifest_files() {
            match self.read_manifest(&manifest, namespace) {
                Ok(found) => {
                    debug!("Found {} entry points in {:?}", found.len(), manifest);
                    declared.entry_points.extend(found);
                }
                Err(e) if self.strict => return Err(e),
                Err(e) => {
                    warn!("Failed to load manifest {:?}: {}", manifest, e);
                    declared.skipped.push(Diagnostic {
                        name: self.name().to_string(),
                        origin: manifest.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(declared)
    }
}

/// Parse the entry points declared under `namespace` in a manifest document.
///
/// Non-string references are kept in their YAML rendering so the registry
/// records them as unusable, quoting what was actually written.
pub fn parse_manifest(content: &str, namespace: &str, origin: &str) -> Result<Vec<EntryPoint>, String> {
    let document: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    let section = match &document {
        serde_yaml::Value::Null => return Ok(Vec::new()),
        serde_yaml::Value::Mapping(mapping) => mapping.get(namespace),
        _ => return Err("manifest must be a mapping of namespaces".to_string()),
    };

    let declared = match section {
        None | Some(serde_yaml::Value::Null) => return Ok(Vec::new()),
        Some(serde_yaml::Value::Mapping(declared)) => declared,
        Some(_) => return Err(format!("'{namespace}' must map names to references")),
    };

    let mut entry_points = Vec::with_capacity(declared.len());
    for (name, value) in declared {
        let Some(name) = name.as_str() else {
            return Err(format!("entry point names under '{namespace}' must be strings"));
        };
        let value = match value.as_str() {
            Some(reference) => reference.to_string(),
            None => serde_yaml::to_string(value)
                .map(|rendered| rendered.trim_end().to_string())
                .map_err(|e| e.to_string())?,
        };
        entry_points.push(EntryPoint::new(name, value, origin));
    }

    Ok(entry_points)
}

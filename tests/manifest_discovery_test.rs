use ingestion_plugin::{EntryDescription, LoadError, RegistryError};
use ingestion_sources::{default_source_registry, RegistryConfig};
use tempfile::TempDir;

fn config_with_manifests(temp_dir: &TempDir) -> RegistryConfig {
    RegistryConfig {
        manifest_directories: vec![temp_dir.path().to_path_buf()],
        include_user_manifests: false,
        ..RegistryConfig::default()
    }
}

fn write_manifest(temp_dir: &TempDir, relative: &str, content: &str) {
    let path = temp_dir.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_manifest_entries_are_registered() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        &temp_dir,
        "acme/entry_points.yaml",
        r#"
ingestion.source.plugins:
  sqlserver: ingestion.source.sql.mssql:SqlServerSource
  acme: acme.sources:AcmeSource
"#,
    );

    let registry = default_source_registry(&config_with_manifests(&temp_dir)).unwrap();

    assert!(registry.is_registered("sqlserver"));
    assert!(registry.is_registered("acme"));
    assert!(registry.diagnostics().is_empty());

    // Declared against a built-in symbol, so it loads the same factory.
    let sqlserver = registry.get("sqlserver").unwrap();
    assert_eq!(sqlserver.platform(), "mssql");

    // Declared but not linked into this build.
    assert!(matches!(
        registry.get("acme"),
        Err(RegistryError::Resolution {
            source: LoadError::SymbolNotFound { .. },
            ..
        })
    ));
}

#[test]
fn test_manifest_cannot_shadow_builtin() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        &temp_dir,
        "entry_points.yml",
        "ingestion.source.plugins:\n  file: thirdparty.sources:BetterFileSource\n",
    );

    let registry = default_source_registry(&config_with_manifests(&temp_dir)).unwrap();

    assert_eq!(registry.diagnostics().len(), 1);
    assert_eq!(registry.diagnostics()[0].name, "file");
    assert!(registry.diagnostics()[0].origin.ends_with("entry_points.yml"));
    assert!(matches!(
        registry.describe("file"),
        Some(EntryDescription::Lazy { ref origin, .. }) if origin == "builtin"
    ));

    let mut strict = config_with_manifests(&temp_dir);
    strict.strict = true;
    assert!(default_source_registry(&strict).is_err());
}

#[test]
fn test_malformed_reference_is_reported_on_lookup() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        &temp_dir,
        "entry_points.yaml",
        "ingestion.source.plugins:\n  broken: not-a-reference\n",
    );

    let registry = default_source_registry(&config_with_manifests(&temp_dir)).unwrap();

    assert!(registry.is_registered("broken"));
    assert_eq!(registry.diagnostics().len(), 1);
    assert!(matches!(
        registry.get("broken"),
        Err(RegistryError::Resolution {
            source: LoadError::MalformedReference { .. },
            ..
        })
    ));
}

#[test]
fn test_invalid_manifest_file() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(&temp_dir, "entry_points.yaml", "ingestion.source.plugins: [oops]\n");

    let registry = default_source_registry(&config_with_manifests(&temp_dir)).unwrap();
    assert!(registry.get("file").is_ok());

    // Skipped, but still reported so `check` can fail on it.
    let diagnostics = registry.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].name, "manifest-directories");
    assert!(diagnostics[0].origin.ends_with("entry_points.yaml"));

    let mut strict = config_with_manifests(&temp_dir);
    strict.strict = true;
    assert!(default_source_registry(&strict).is_err());
}

#[test]
fn test_non_string_reference_is_quoted_in_error() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        &temp_dir,
        "entry_points.yaml",
        "ingestion.source.plugins:\n  numeric: 42\n",
    );

    let registry = default_source_registry(&config_with_manifests(&temp_dir)).unwrap();
    let err = registry.get("numeric").unwrap_err();
    assert!(err.to_string().contains("'42'"), "{err}");
}

#[test]
fn test_missing_manifest_directories_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config_with_manifests(&temp_dir);
    config
        .manifest_directories
        .push(temp_dir.path().join("does-not-exist"));

    let registry = default_source_registry(&config).unwrap();
    assert!(registry.is_registered("mssql"));
    assert!(registry.is_registered("mssql-odbc"));
}

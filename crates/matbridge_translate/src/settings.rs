// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion settings.
//!
//! Settings are stored as RON and select:
//! - The source and destination schemas
//! - The node types that bound a crawl
//! - Extra schema files merged into the built-in tables
//! - Whether edges are rebuilt after translation

use crate::error::{SchemaError, SettingsError};
use crate::schema::SchemaRegistry;
use matbridge_graph::DEFAULT_STOP_LIST;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Settings format version
    pub version: u32,
    /// Source schema name
    pub source_schema: String,
    /// Destination schema name
    pub destination_schema: String,
    /// Node types the crawl does not enter
    pub stop_list: Vec<String>,
    /// RON schema files registered on top of the built-in schemas
    pub schema_files: Vec<PathBuf>,
    /// Rebuild edges between translated nodes
    pub reconnect: bool,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            source_schema: crate::builtin::ARNOLD.to_string(),
            destination_schema: crate::builtin::RENDERMAN.to_string(),
            stop_list: DEFAULT_STOP_LIST.iter().map(|s| s.to_string()).collect(),
            schema_files: Vec::new(),
            reconnect: true,
        }
    }
}

impl ConvertSettings {
    /// Parse settings from RON
    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        let settings: ConvertSettings = ron::from_str(source)?;
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        Ok(settings)
    }

    /// Serialize settings as RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Built-in schemas plus every configured schema file.
    ///
    /// Relative schema paths are resolved against `base_dir`.
    pub fn build_registry(&self, base_dir: &Path) -> Result<SchemaRegistry, SchemaError> {
        let mut registry = SchemaRegistry::builtin();
        for file in &self.schema_files {
            registry.load_file(&base_dir.join(file))?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ConvertSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.source_schema, "arnold");
        assert_eq!(settings.destination_schema, "renderman");
        assert!(settings.stop_list.contains(&"place2dTexture".to_string()));
        assert!(settings.reconnect);
    }

    #[test]
    fn test_serialization() {
        let settings = ConvertSettings {
            reconnect: false,
            ..ConvertSettings::default()
        };
        let ron_str = settings.to_ron().unwrap();
        let loaded = ConvertSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = ConvertSettings::from_ron("(reconnect: false)").unwrap();
        assert!(!loaded.reconnect);
        assert_eq!(loaded.source_schema, "arnold");
        assert_eq!(loaded.stop_list.len(), DEFAULT_STOP_LIST.len());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = ConvertSettings::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_missing_schema_file() {
        let settings = ConvertSettings {
            schema_files: vec![PathBuf::from("does-not-exist.ron")],
            ..ConvertSettings::default()
        };
        let err = settings.build_registry(&std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for schema loading, node translation and conversion runs.

use matbridge_graph::{NodeId, SceneError};
use thiserror::Error;

/// Schema table errors
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No schema registered under this name
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// A node type entry does not name its own converted type
    #[error("Schema {schema}: node type {node_type} has no type name entry")]
    MissingTypeName {
        /// Schema containing the entry
        schema: String,
        /// Offending node type
        node_type: String,
    },

    /// RON parse error
    #[error("Failed to parse schema file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to translate one node
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    /// The source schema has no entry for the node's type
    #[error("No schema entry for {node} ({node_type})")]
    SchemaMissing {
        /// Source node
        node: NodeId,
        /// Native source type
        node_type: String,
    },

    /// The destination schema has no node type for the common type
    #[error("No destination type for {node} (common type {common_type})")]
    DestinationMissing {
        /// Source node
        node: NodeId,
        /// Common type the source maps to
        common_type: String,
    },

    /// The scene refused to read the node or create its replacement
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Errors that stop a whole conversion run
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source or destination schema unavailable
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A seed node could not be read
    #[error("Crawl failed: {0}")]
    Crawl(SceneError),

    /// The scene selection could not be read
    #[error("Failed to read selection: {0}")]
    Selection(SceneError),
}

/// Settings file errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// Settings written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest readable version
        supported: u32,
    },
}

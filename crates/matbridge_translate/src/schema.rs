// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema tables and the registry that holds them.
//!
//! A source schema maps each native node type to a common type and each
//! native attribute to an ordered list of common attributes (fan-out). A
//! destination schema maps each common type to a native type and each common
//! attribute to one native attribute. Translation always passes through the
//! common layer, so any source schema can be paired with any destination.

use crate::error::SchemaError;
use crate::transform::Transform;
use indexmap::IndexMap;
use matbridge_graph::AttrValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a native value becomes a common value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum FieldRule {
    /// Copy the value, taking the first component of a packed list
    #[default]
    Copy,
    /// Apply a transform to the raw value
    Transform(Transform),
}

/// One common attribute fed by a native attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Common attribute name
    pub common: String,
    /// Value rule
    #[serde(default)]
    pub rule: FieldRule,
}

impl MappingEntry {
    /// Plain copy into `common`
    pub fn copy(common: impl Into<String>) -> Self {
        Self {
            common: common.into(),
            rule: FieldRule::Copy,
        }
    }

    /// Transformed copy into `common`
    pub fn transform(common: impl Into<String>, transform: Transform) -> Self {
        Self {
            common: common.into(),
            rule: FieldRule::Transform(transform),
        }
    }

    /// Whether the entry carries a transform
    pub fn has_transform(&self) -> bool {
        matches!(self.rule, FieldRule::Transform(_))
    }

    /// Compute the common value from a raw native value.
    ///
    /// `None` when the transform cannot handle the value.
    pub fn resolve(&self, raw: &AttrValue) -> Option<AttrValue> {
        match &self.rule {
            FieldRule::Copy => Some(raw.unpacked()),
            FieldRule::Transform(transform) => transform.apply(raw),
        }
    }
}

/// Native-to-common table for one source node type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceNodeSchema {
    /// Common type the node converts to
    pub common_type: String,
    /// Native attribute to ordered common entries
    #[serde(default)]
    pub fields: IndexMap<String, Vec<MappingEntry>>,
}

impl SourceNodeSchema {
    /// Create a table for a node converting to `common_type`
    pub fn new(common_type: impl Into<String>) -> Self {
        Self {
            common_type: common_type.into(),
            fields: IndexMap::new(),
        }
    }

    /// Append an entry to a native attribute
    pub fn entry(mut self, native: &str, entry: MappingEntry) -> Self {
        self.fields.entry(native.to_string()).or_default().push(entry);
        self
    }

    /// Copy `native` into `common`
    pub fn copy(self, native: &str, common: &str) -> Self {
        self.entry(native, MappingEntry::copy(common))
    }

    /// Copy an attribute whose common name is its native name
    pub fn same(self, name: &str) -> Self {
        self.copy(name, name)
    }

    /// Copy `native` into every name in `commons`, in order
    pub fn fan_out(self, native: &str, commons: &[&str]) -> Self {
        commons
            .iter()
            .fold(self, |schema, common| schema.copy(native, common))
    }

    /// Transform `native` into `common`
    pub fn transform(self, native: &str, common: &str, transform: Transform) -> Self {
        self.entry(native, MappingEntry::transform(common, transform))
    }

    /// Entries of one native attribute
    pub fn entries(&self, native: &str) -> &[MappingEntry] {
        self.fields.get(native).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A complete native-to-common schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSchema {
    /// Schema identifier (e.g. `"arnold"`)
    pub name: String,
    /// Tables by native node type
    #[serde(default)]
    pub nodes: IndexMap<String, SourceNodeSchema>,
}

impl SourceSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
        }
    }

    /// Add a node type table
    pub fn with_node(mut self, node_type: &str, node: SourceNodeSchema) -> Self {
        self.nodes.insert(node_type.to_string(), node);
        self
    }

    fn validate(&self) -> Result<(), SchemaError> {
        match self
            .nodes
            .iter()
            .find(|(_, node)| node.common_type.is_empty())
        {
            Some((node_type, _)) => Err(SchemaError::MissingTypeName {
                schema: self.name.clone(),
                node_type: node_type.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Common-to-native table for one common node type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationNodeSchema {
    /// Native type to instantiate
    pub native_type: String,
    /// Common attribute to native attribute
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl DestinationNodeSchema {
    /// Create a table instantiating `native_type`
    pub fn new(native_type: impl Into<String>) -> Self {
        Self {
            native_type: native_type.into(),
            fields: IndexMap::new(),
        }
    }

    /// Map `common` onto `native`
    pub fn rename(mut self, common: &str, native: &str) -> Self {
        self.fields.insert(common.to_string(), native.to_string());
        self
    }

    /// Map attributes whose native names match their common names
    pub fn same(self, names: &[&str]) -> Self {
        names.iter().fold(self, |schema, name| schema.rename(name, name))
    }

    /// Native name of a common attribute
    pub fn native(&self, common: &str) -> Option<&str> {
        self.fields.get(common).map(String::as_str)
    }
}

/// A complete common-to-native schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationSchema {
    /// Schema identifier (e.g. `"renderman"`)
    pub name: String,
    /// Tables by common node type
    #[serde(default)]
    pub nodes: IndexMap<String, DestinationNodeSchema>,
}

impl DestinationSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
        }
    }

    /// Add a common type table
    pub fn with_node(mut self, common_type: &str, node: DestinationNodeSchema) -> Self {
        self.nodes.insert(common_type.to_string(), node);
        self
    }

    fn validate(&self) -> Result<(), SchemaError> {
        match self
            .nodes
            .iter()
            .find(|(_, node)| node.native_type.is_empty())
        {
            Some((common_type, _)) => Err(SchemaError::MissingTypeName {
                schema: self.name.clone(),
                node_type: common_type.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Contents of a schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SchemaFile {
    /// Native-to-common tables
    Source(SourceSchema),
    /// Common-to-native tables
    Destination(DestinationSchema),
}

/// Immutable collection of schemas, built once before any conversion
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    sources: IndexMap<String, SourceSchema>,
    destinations: IndexMap<String, DestinationSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in schemas
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.sources.insert(
            crate::builtin::ARNOLD.to_string(),
            crate::builtin::arnold(),
        );
        registry.destinations.insert(
            crate::builtin::RENDERMAN.to_string(),
            crate::builtin::renderman(),
        );
        registry
    }

    /// Add a source schema, merging node tables into one of the same name
    pub fn register_source(&mut self, schema: SourceSchema) -> Result<(), SchemaError> {
        schema.validate()?;
        tracing::debug!(
            "Registering source schema {} ({} node types)",
            schema.name,
            schema.nodes.len()
        );
        match self.sources.get_mut(&schema.name) {
            Some(existing) => existing.nodes.extend(schema.nodes),
            None => {
                self.sources.insert(schema.name.clone(), schema);
            }
        }
        Ok(())
    }

    /// Add a destination schema, merging node tables into one of the same name
    pub fn register_destination(&mut self, schema: DestinationSchema) -> Result<(), SchemaError> {
        schema.validate()?;
        tracing::debug!(
            "Registering destination schema {} ({} node types)",
            schema.name,
            schema.nodes.len()
        );
        match self.destinations.get_mut(&schema.name) {
            Some(existing) => existing.nodes.extend(schema.nodes),
            None => {
                self.destinations.insert(schema.name.clone(), schema);
            }
        }
        Ok(())
    }

    /// Parse and register a schema from RON text
    pub fn register_ron(&mut self, source: &str) -> Result<(), SchemaError> {
        match ron::from_str::<SchemaFile>(source)? {
            SchemaFile::Source(schema) => self.register_source(schema),
            SchemaFile::Destination(schema) => self.register_destination(schema),
        }
    }

    /// Load and register a RON schema file
    pub fn load_file(&mut self, path: &Path) -> Result<(), SchemaError> {
        let contents = std::fs::read_to_string(path)?;
        self.register_ron(&contents)?;
        tracing::info!("Loaded schema file {}", path.display());
        Ok(())
    }

    /// Registered source schema names
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Registered destination schema names
    pub fn destination_names(&self) -> impl Iterator<Item = &str> {
        self.destinations.keys().map(String::as_str)
    }

    /// Select the tables for one conversion direction
    pub fn pair(&self, from: &str, to: &str) -> Result<SchemaPair<'_>, SchemaError> {
        let source = self
            .sources
            .get(from)
            .ok_or_else(|| SchemaError::UnknownSchema(from.to_string()))?;
        let destination = self
            .destinations
            .get(to)
            .ok_or_else(|| SchemaError::UnknownSchema(to.to_string()))?;
        Ok(SchemaPair {
            source,
            destination,
        })
    }
}

/// Borrowed source and destination tables for one conversion
#[derive(Debug, Clone, Copy)]
pub struct SchemaPair<'a> {
    source: &'a SourceSchema,
    destination: &'a DestinationSchema,
}

impl<'a> SchemaPair<'a> {
    /// Source schema
    pub fn source(&self) -> &'a SourceSchema {
        self.source
    }

    /// Destination schema
    pub fn destination(&self) -> &'a DestinationSchema {
        self.destination
    }

    /// Table for a native source type
    pub fn source_node(&self, node_type: &str) -> Option<&'a SourceNodeSchema> {
        self.source.nodes.get(node_type)
    }

    /// Table for a common type
    pub fn destination_node(&self, common_type: &str) -> Option<&'a DestinationNodeSchema> {
        self.destination.nodes.get(common_type)
    }

    /// Common entries fed by a native attribute
    pub fn map_from_source(&self, node_type: &str, attribute: &str) -> &'a [MappingEntry] {
        self.source_node(node_type)
            .map(|node| node.entries(attribute))
            .unwrap_or(&[])
    }

    /// Common type a native source type converts to
    pub fn destination_type_name(&self, node_type: &str) -> Option<&'a str> {
        self.source_node(node_type).map(|node| node.common_type.as_str())
    }

    /// Native destination attribute for a common attribute
    pub fn map_to_destination(&self, common_type: &str, common: &str) -> Option<&'a str> {
        self.destination_node(common_type)
            .and_then(|node| node.native(common))
    }

    /// Native destination type instantiated for a common type
    pub fn native_type(&self, common_type: &str) -> Option<&'a str> {
        self.destination_node(common_type)
            .map(|node| node.native_type.as_str())
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source attributes with a path to destination attributes.

use crate::schema::SchemaPair;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::HashMap;

/// Translatable attributes of one source node type.
///
/// Maps each source attribute to the destination attributes its common
/// entries resolve to, in entry order. Attributes without any destination
/// are left out. Depends only on the schema tables, never on live values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    node_type: String,
    common_type: String,
    fields: IndexMap<String, Vec<String>>,
}

impl Intersection {
    /// Compute the intersection for a source node type.
    ///
    /// Returns `None` when the source schema has no entry for the type. A
    /// common type missing from the destination yields an empty intersection.
    pub fn compute(pair: &SchemaPair<'_>, node_type: &str) -> Option<Self> {
        let source = pair.source_node(node_type)?;
        let common_type = source.common_type.clone();

        let mut fields = IndexMap::new();
        for (attribute, entries) in &source.fields {
            let mut targets: Vec<String> = Vec::new();
            for entry in entries {
                if let Some(native) = pair.map_to_destination(&common_type, &entry.common) {
                    if !targets.iter().any(|t| t == native) {
                        targets.push(native.to_string());
                    }
                }
            }
            if !targets.is_empty() {
                fields.insert(attribute.clone(), targets);
            }
        }

        Some(Self {
            node_type: node_type.to_string(),
            common_type,
            fields,
        })
    }

    /// Source node type
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Common type the source converts to
    pub fn common_type(&self) -> &str {
        &self.common_type
    }

    /// Destination attributes for a source attribute
    pub fn destinations(&self, attribute: &str) -> &[String] {
        self.fields.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First destination attribute for a source attribute
    pub fn first_destination(&self, attribute: &str) -> Option<&str> {
        self.destinations(attribute).first().map(String::as_str)
    }

    /// Whether a source attribute can be translated
    pub fn contains(&self, attribute: &str) -> bool {
        self.fields.contains_key(attribute)
    }

    /// Source attribute to destination attributes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of translatable source attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing can be translated
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Intersections of every node type in a run, computed once per type
#[derive(Debug)]
pub struct IntersectionCache<'a> {
    pair: SchemaPair<'a>,
    by_type: HashMap<String, Option<Intersection>>,
}

impl<'a> IntersectionCache<'a> {
    /// Create an empty cache over a schema pair
    pub fn new(pair: SchemaPair<'a>) -> Self {
        Self {
            pair,
            by_type: HashMap::new(),
        }
    }

    /// Compute intersections for every given node type not seen yet
    pub fn prepare<'t>(&mut self, node_types: impl IntoIterator<Item = &'t str>) {
        for node_type in node_types {
            if self.by_type.contains_key(node_type) {
                continue;
            }
            let intersection = Intersection::compute(&self.pair, node_type);
            if let Some(i) = &intersection {
                tracing::debug!(
                    "Intersection for {} -> {}: {} attributes",
                    node_type,
                    i.common_type(),
                    i.len()
                );
            }
            self.by_type.insert(node_type.to_string(), intersection);
        }
    }

    /// Intersection of a prepared node type
    pub fn get(&self, node_type: &str) -> Option<&Intersection> {
        self.by_type.get(node_type).and_then(Option::as_ref)
    }

    /// Intersection of a node type, computed on the spot if it was never
    /// prepared. `None` when the source schema does not know the type.
    pub fn get_or_compute(&self, node_type: &str) -> Option<Cow<'_, Intersection>> {
        match self.by_type.get(node_type) {
            Some(prepared) => prepared.as_ref().map(Cow::Borrowed),
            None => Intersection::compute(&self.pair, node_type).map(Cow::Owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        DestinationNodeSchema, DestinationSchema, SchemaRegistry, SourceNodeSchema, SourceSchema,
    };

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register_source(SourceSchema::new("src").with_node(
                "lambert",
                SourceNodeSchema::new("surfaceShader")
                    .copy("color", "baseColor")
                    .fan_out("thin", &["a", "b", "c"])
                    .same("glow"),
            ))
            .unwrap();
        registry
            .register_destination(DestinationSchema::new("dst").with_node(
                "surfaceShader",
                DestinationNodeSchema::new("PxrSurface")
                    .rename("baseColor", "diffuseColor")
                    .rename("a", "aNative")
                    .rename("c", "cNative"),
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_fan_out_subset_and_pruning() {
        let registry = registry();
        let pair = registry.pair("src", "dst").unwrap();
        let intersection = Intersection::compute(&pair, "lambert").unwrap();

        assert_eq!(intersection.destinations("color"), ["diffuseColor"]);
        assert_eq!(intersection.destinations("thin"), ["aNative", "cNative"]);
        assert!(!intersection.contains("glow"));
        assert_eq!(intersection.len(), 2);
        assert_eq!(intersection.first_destination("thin"), Some("aNative"));
    }

    #[test]
    fn test_unknown_type() {
        let registry = registry();
        let pair = registry.pair("src", "dst").unwrap();
        assert!(Intersection::compute(&pair, "blinn").is_none());
    }

    #[test]
    fn test_cache_prepares_once() {
        let registry = registry();
        let mut cache = IntersectionCache::new(registry.pair("src", "dst").unwrap());
        cache.prepare(["lambert", "lambert", "blinn"]);

        assert!(cache.get("lambert").is_some());
        assert!(cache.get("blinn").is_none());
        assert!(cache.get("never_prepared").is_none());
    }

    #[test]
    fn test_get_or_compute_unprepared() {
        let registry = registry();
        let mut cache = IntersectionCache::new(registry.pair("src", "dst").unwrap());

        let computed = cache.get_or_compute("lambert").unwrap();
        assert!(matches!(computed, Cow::Owned(_)));
        assert_eq!(computed.destinations("color"), ["diffuseColor"]);
        assert!(cache.get_or_compute("blinn").is_none());

        cache.prepare(["lambert"]);
        assert!(matches!(cache.get_or_compute("lambert"), Some(Cow::Borrowed(_))));
    }
}

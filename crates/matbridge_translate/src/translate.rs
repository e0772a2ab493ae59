// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translation of a single node into the destination schema.

use crate::error::TranslateError;
use crate::intersection::IntersectionCache;
use crate::record::{plan_assignments, Assignment, Coercion, CommonRecord};
use crate::report::{FieldSkip, FieldSkipReason};
use crate::schema::SchemaPair;
use matbridge_graph::{Node, NodeId, SceneAdapter, SceneError};

/// Result of translating one node
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedNode {
    /// Source node
    pub source: NodeId,
    /// Created destination node
    pub destination: NodeId,
    /// Native destination type
    pub native_type: String,
    /// Common values read from the source
    pub record: CommonRecord,
    /// Destination sockets written
    pub assigned: Vec<String>,
    /// Attributes that were not written
    pub skipped: Vec<FieldSkip>,
}

/// Rebuilds nodes through the common layer
#[derive(Debug, Clone, Copy)]
pub struct NodeTranslator<'a> {
    pair: SchemaPair<'a>,
}

impl<'a> NodeTranslator<'a> {
    /// Create a translator over a schema pair
    pub fn new(pair: SchemaPair<'a>) -> Self {
        Self { pair }
    }

    /// Read the source node's values into a common record.
    ///
    /// Only attributes with a destination counterpart are read. Everything
    /// else the source table lists is reported as unmapped.
    pub fn read_record<S>(
        &self,
        scene: &S,
        node: &Node,
        intersections: &IntersectionCache<'_>,
        skipped: &mut Vec<FieldSkip>,
    ) -> Result<CommonRecord, TranslateError>
    where
        S: SceneAdapter + ?Sized,
    {
        let source = self
            .pair
            .source_node(&node.node_type)
            .ok_or_else(|| schema_missing(node))?;
        let mut record = CommonRecord::new(source.common_type.clone());
        let intersection = intersections
            .get_or_compute(&node.node_type)
            .ok_or_else(|| schema_missing(node))?;

        for (attribute, entries) in &source.fields {
            if !intersection.contains(attribute) {
                tracing::debug!("{}.{} has no destination attribute", node.name, attribute);
                skipped.push(FieldSkip::new(&node.name, attribute, FieldSkipReason::Unmapped));
                continue;
            }

            let read = scene
                .attribute_value(&node.name, attribute)
                .and_then(|value| Ok((value, scene.attribute_type(&node.name, attribute)?)));
            let (raw, source_type) = match read {
                Ok(read) => read,
                Err(e) => {
                    tracing::warn!("Cannot read {}.{}: {}", node.name, attribute, e);
                    skipped.push(
                        FieldSkip::new(&node.name, attribute, FieldSkipReason::ReadFailed)
                            .with_detail(e),
                    );
                    continue;
                }
            };

            for common in record.add_source_value(entries, &raw, &source_type) {
                tracing::warn!(
                    "Transform {} -> {} failed on {} ({})",
                    attribute,
                    common,
                    node.name,
                    raw
                );
                skipped.push(
                    FieldSkip::new(&node.name, attribute, FieldSkipReason::TransformFailed)
                        .with_detail(format!("{common} from {raw}")),
                );
            }
        }
        Ok(record)
    }

    /// Create the destination node for `node` and copy its values over.
    ///
    /// Fails only when the node's type is unknown to either schema or the
    /// scene cannot create the destination node; in that case nothing is
    /// created. Rejected attribute writes are skipped and reported.
    pub fn translate<S>(
        &self,
        scene: &mut S,
        node: &Node,
        intersections: &IntersectionCache<'_>,
    ) -> Result<TranslatedNode, TranslateError>
    where
        S: SceneAdapter + ?Sized,
    {
        let common_type = self
            .pair
            .destination_type_name(&node.node_type)
            .ok_or_else(|| schema_missing(node))?;
        let destination =
            self.pair
                .destination_node(common_type)
                .ok_or_else(|| TranslateError::DestinationMissing {
                    node: node.name.clone(),
                    common_type: common_type.to_string(),
                })?;

        let mut skipped = Vec::new();
        let record = self.read_record(&*scene, node, intersections, &mut skipped)?;

        let created = scene.create_node(&destination.native_type)?;
        tracing::debug!(
            "Created {} ({}) for {} ({})",
            created,
            destination.native_type,
            node.name,
            node.node_type
        );

        let mut assigned = Vec::new();
        for assignment in plan_assignments(&record, destination) {
            match assign(scene, &created, &assignment) {
                Ok(()) => assigned.push(assignment.socket),
                Err(e) => {
                    let reason = if e.is_rejection() {
                        FieldSkipReason::CoercionExhausted
                    } else {
                        FieldSkipReason::WriteFailed
                    };
                    tracing::warn!(
                        "Skipping {}.{} (from {}): {}",
                        created,
                        assignment.socket,
                        assignment.common,
                        e
                    );
                    skipped.push(FieldSkip::new(&node.name, assignment.socket, reason).with_detail(e));
                }
            }
        }

        Ok(TranslatedNode {
            source: node.name.clone(),
            destination: created,
            native_type: destination.native_type.clone(),
            record,
            assigned,
            skipped,
        })
    }
}

fn schema_missing(node: &Node) -> TranslateError {
    TranslateError::SchemaMissing {
        node: node.name.clone(),
        node_type: node.node_type.clone(),
    }
}

/// Write one value, falling back to a single coercion if the host rejects it
fn assign<S>(scene: &mut S, node: &NodeId, assignment: &Assignment) -> Result<(), SceneError>
where
    S: SceneAdapter + ?Sized,
{
    let socket = assignment.socket.as_str();
    let rejected = match scene.set_attribute(node, socket, &assignment.value, None) {
        Ok(()) => return Ok(()),
        Err(e) if e.is_rejection() => e,
        Err(e) => return Err(e),
    };

    let destination_type = scene.attribute_type(node, socket)?;
    let coercion = Coercion::choose(&assignment.value, &assignment.source_type, &destination_type);
    tracing::debug!(
        "{}.{} rejected {} ({}), retrying with {}",
        node,
        socket,
        assignment.value,
        rejected,
        coercion.name()
    );
    scene.set_attribute(node, socket, coercion.value(), coercion.explicit_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        DestinationNodeSchema, DestinationSchema, SchemaRegistry, SourceNodeSchema, SourceSchema,
    };
    use crate::transform::Transform;
    use matbridge_graph::{AttrSpec, AttrType, AttrValue, MemoryScene, NodeTemplate};

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register_source(SourceSchema::new("src").with_node(
                "lambert",
                SourceNodeSchema::new("surfaceShader")
                    .copy("diffuse", "diffuseGain")
                    .copy("color", "diffuseColor")
                    .transform("translucence", "presence", Transform::OneMinus)
                    .same("glowIntensity"),
            ))
            .unwrap();
        registry
            .register_destination(DestinationSchema::new("dst").with_node(
                "surfaceShader",
                DestinationNodeSchema::new("PxrSurface").same(&[
                    "diffuseGain",
                    "diffuseColor",
                    "presence",
                ]),
            ))
            .unwrap();
        registry
    }

    fn scene() -> (MemoryScene, Node) {
        let mut scene = MemoryScene::new();
        scene.add_template(
            "PxrSurface",
            NodeTemplate::new()
                .with(AttrSpec::new("diffuseGain", AttrType::Float, AttrValue::Float(1.0)))
                .with(AttrSpec::new(
                    "diffuseColor",
                    AttrType::Float3,
                    AttrValue::Vector3([0.18; 3]),
                ))
                .with(AttrSpec::new("presence", AttrType::Float, AttrValue::Float(1.0)).with_min(0.0)),
        );
        let id = scene.add_node("lambert1", "lambert");
        scene
            .add_attribute(&id, "diffuse", AttrType::Float, AttrValue::Float(0.8))
            .unwrap();
        scene
            .add_attribute(&id, "color", AttrType::Float, AttrValue::Float(0.5))
            .unwrap();
        scene
            .add_attribute(&id, "translucence", AttrType::Float, AttrValue::Float(1.5))
            .unwrap();
        (scene, Node::seed(id, "lambert"))
    }

    fn translate(scene: &mut MemoryScene, node: &Node) -> Result<TranslatedNode, TranslateError> {
        let registry = registry();
        let pair = registry.pair("src", "dst").unwrap();
        let mut cache = IntersectionCache::new(pair);
        cache.prepare([node.node_type.as_str()]);
        NodeTranslator::new(pair).translate(scene, node, &cache)
    }

    #[test]
    fn test_translate_writes_values() {
        let (mut scene, node) = scene();
        let translated = translate(&mut scene, &node).unwrap();

        assert_eq!(translated.destination, NodeId::new("PxrSurface1"));
        assert_eq!(
            scene.value(&translated.destination, "diffuseGain"),
            Some(&AttrValue::Float(0.8))
        );
        // Scalar into a color broadcasts
        assert_eq!(
            scene.value(&translated.destination, "diffuseColor"),
            Some(&AttrValue::Vector3([0.5, 0.5, 0.5]))
        );
        // 1 - 1.5 is rejected by the minimum, the absolute value is written
        assert_eq!(
            scene.value(&translated.destination, "presence"),
            Some(&AttrValue::Float(0.5))
        );
    }

    #[test]
    fn test_unmapped_fields_reported() {
        let (mut scene, node) = scene();
        let translated = translate(&mut scene, &node).unwrap();

        assert_eq!(translated.skipped.len(), 1);
        assert_eq!(translated.skipped[0].field, "glowIntensity");
        assert_eq!(translated.skipped[0].reason, FieldSkipReason::Unmapped);
    }

    #[test]
    fn test_schema_missing_creates_nothing() {
        let (mut scene, _) = scene();
        let blinn = scene.add_node("blinn1", "blinn");
        let before = scene.node_count();

        let err = translate(&mut scene, &Node::seed(blinn.clone(), "blinn")).unwrap_err();
        assert_eq!(
            err,
            TranslateError::SchemaMissing {
                node: blinn,
                node_type: "blinn".to_string()
            }
        );
        assert_eq!(scene.node_count(), before);
    }

    #[test]
    fn test_read_failure_skips_field() {
        // Source node missing two of its attributes
        let mut scene = MemoryScene::new();
        scene.add_template(
            "PxrSurface",
            NodeTemplate::new().with(AttrSpec::new("diffuseGain", AttrType::Float, AttrValue::Float(1.0))),
        );
        let id = scene.add_node("lambert1", "lambert");
        scene
            .add_attribute(&id, "diffuse", AttrType::Float, AttrValue::Float(0.8))
            .unwrap();
        let node = Node::seed(id, "lambert");

        let translated = translate(&mut scene, &node).unwrap();
        let reasons: Vec<_> = translated
            .skipped
            .iter()
            .map(|s| (s.field.as_str(), s.reason))
            .collect();
        assert!(reasons.contains(&("color", FieldSkipReason::ReadFailed)));
        assert!(reasons.contains(&("translucence", FieldSkipReason::ReadFailed)));
        assert_eq!(translated.assigned, vec!["diffuseGain".to_string()]);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scene used by tests and the command line tool.
//!
//! `MemoryScene` behaves like a strict host: attributes are typed, string
//! attributes only accept writes that declare their type, vector attributes
//! only accept vectors, and attributes with a minimum reject smaller values.
//! Compound reads come back packed in a one-element list, the way hosts
//! report them.

use crate::edge::{Connection, Direction, Edge};
use crate::node::NodeId;
use crate::plug::Plug;
use crate::scene::{SceneAdapter, SceneError};
use crate::value::{AttrType, AttrValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute declaration in a node template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrSpec {
    /// Attribute name
    pub name: String,
    /// Storage type
    pub attr_type: AttrType,
    /// Value of a freshly created node
    pub default: AttrValue,
    /// Smallest accepted scalar
    #[serde(default)]
    pub min: Option<f64>,
}

impl AttrSpec {
    /// Declare an attribute
    pub fn new(name: impl Into<String>, attr_type: AttrType, default: AttrValue) -> Self {
        Self {
            name: name.into(),
            attr_type,
            default,
            min: None,
        }
    }

    /// Set a lower bound
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }
}

/// Attributes a node type is created with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// Declared attributes
    pub attributes: Vec<AttrSpec>,
}

impl NodeTemplate {
    /// Create an empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute declaration
    pub fn with(mut self, spec: AttrSpec) -> Self {
        self.attributes.push(spec);
        self
    }
}

/// A live attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryAttribute {
    /// Storage type
    pub attr_type: AttrType,
    /// Current value
    pub value: AttrValue,
    /// Smallest accepted scalar
    #[serde(default)]
    pub min: Option<f64>,
}

/// A live node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryNode {
    /// Native node type
    pub node_type: String,
    /// Attributes by name
    pub attributes: IndexMap<String, MemoryAttribute>,
}

/// Scene held entirely in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryScene {
    nodes: IndexMap<NodeId, MemoryNode>,
    connections: Vec<Connection>,
    selection: Vec<NodeId>,
    templates: IndexMap<String, NodeTemplate>,
}

impl MemoryScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a scene from RON
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    /// Serialize the scene as RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Register the template used by [`SceneAdapter::create_node`]
    pub fn add_template(&mut self, node_type: impl Into<String>, template: NodeTemplate) {
        self.templates.insert(node_type.into(), template);
    }

    /// Add a node with no attributes
    pub fn add_node(&mut self, name: impl Into<NodeId>, node_type: impl Into<String>) -> NodeId {
        let id = name.into();
        self.nodes.insert(
            id.clone(),
            MemoryNode {
                node_type: node_type.into(),
                attributes: IndexMap::new(),
            },
        );
        id
    }

    /// Add or replace an attribute on an existing node
    pub fn add_attribute(
        &mut self,
        node: &NodeId,
        name: impl Into<String>,
        attr_type: AttrType,
        value: AttrValue,
    ) -> Result<(), SceneError> {
        let entry = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| SceneError::NodeNotFound(node.clone()))?;
        entry.attributes.insert(
            name.into(),
            MemoryAttribute {
                attr_type,
                value,
                min: None,
            },
        );
        Ok(())
    }

    /// Add a node to the selection
    pub fn select(&mut self, node: &NodeId) {
        if !self.selection.contains(node) {
            self.selection.push(node.clone());
        }
    }

    /// Get a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    /// Nodes of one native type
    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a NodeId> {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.node_type == node_type)
            .map(|(id, _)| id)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Stored value of an attribute, without host packing
    pub fn value(&self, node: &NodeId, socket: &str) -> Option<&AttrValue> {
        self.nodes
            .get(node)
            .and_then(|n| n.attributes.get(socket))
            .map(|a| &a.value)
    }

    /// Every connection in the scene
    pub fn all_connections(&self) -> &[Connection] {
        &self.connections
    }

    fn attribute(&self, node: &NodeId, socket: &str) -> Result<&MemoryAttribute, SceneError> {
        let entry = self
            .nodes
            .get(node)
            .ok_or_else(|| SceneError::NodeNotFound(node.clone()))?;
        entry
            .attributes
            .get(socket)
            .ok_or_else(|| SceneError::AttributeNotFound(node.plug(socket)))
    }

    fn next_name(&self, node_type: &str) -> NodeId {
        (1..)
            .map(|n| NodeId::new(format!("{node_type}{n}")))
            .find(|id| !self.nodes.contains_key(id))
            .unwrap_or_else(|| NodeId::new(node_type))
    }
}

/// Validate a write against an attribute and convert it to stored form
fn checked_value(
    plug: &Plug,
    attribute: &MemoryAttribute,
    value: &AttrValue,
    explicit_type: Option<&AttrType>,
) -> Result<AttrValue, SceneError> {
    let expected = &attribute.attr_type;
    let mismatch = |value: &AttrValue| SceneError::TypeMismatch {
        plug: plug.clone(),
        expected: expected.clone(),
        value: value.clone(),
    };

    // Hosts flatten a packed single value on write
    let value = match value {
        AttrValue::List(items) if items.len() == 1 => &items[0],
        other => other,
    };

    match explicit_type {
        Some(declared) => {
            if !declared.same_family(expected) || !declared.fits(value) {
                return Err(mismatch(value));
            }
        }
        None => {
            let accepted = match expected {
                AttrType::String | AttrType::Message | AttrType::Other(_) => false,
                t => t.fits(value),
            };
            if !accepted {
                return Err(mismatch(value));
            }
        }
    }

    if let (Some(min), Some(v)) = (attribute.min, value.as_f64()) {
        if v < min {
            return Err(SceneError::OutOfRange {
                plug: plug.clone(),
                value: v,
                min,
            });
        }
    }

    let stored = match (expected, value.as_f64()) {
        (AttrType::Bool, Some(v)) => AttrValue::Bool(v != 0.0),
        (AttrType::Int | AttrType::Enum, Some(v)) => AttrValue::Int(v as i64),
        (AttrType::Float | AttrType::Double, Some(v)) => AttrValue::Float(v),
        _ => value.clone(),
    };
    Ok(stored)
}

impl SceneAdapter for MemoryScene {
    fn selection(&self) -> Result<Vec<(NodeId, String)>, SceneError> {
        self.selection
            .iter()
            .map(|id| Ok((id.clone(), self.node_type(id)?)))
            .collect()
    }

    fn node_type(&self, node: &NodeId) -> Result<String, SceneError> {
        self.nodes
            .get(node)
            .map(|n| n.node_type.clone())
            .ok_or_else(|| SceneError::NodeNotFound(node.clone()))
    }

    fn connections(&self, node: &NodeId, direction: Direction) -> Result<Vec<Edge>, SceneError> {
        if !self.nodes.contains_key(node) {
            return Err(SceneError::NodeNotFound(node.clone()));
        }
        let edges = self
            .connections
            .iter()
            .filter_map(|c| match direction {
                Direction::Incoming if &c.to.node == node => {
                    Some(Edge::new(c.to.socket.clone(), c.from.clone()))
                }
                Direction::Outgoing if &c.from.node == node => {
                    Some(Edge::new(c.from.socket.clone(), c.to.clone()))
                }
                _ => None,
            })
            .collect();
        Ok(edges)
    }

    fn attribute_value(&self, node: &NodeId, socket: &str) -> Result<AttrValue, SceneError> {
        let attribute = self.attribute(node, socket)?;
        if attribute.attr_type.is_vector3() {
            return Ok(AttrValue::List(vec![attribute.value.clone()]));
        }
        Ok(attribute.value.clone())
    }

    fn attribute_type(&self, node: &NodeId, socket: &str) -> Result<AttrType, SceneError> {
        Ok(self.attribute(node, socket)?.attr_type.clone())
    }

    fn create_node(&mut self, node_type: &str) -> Result<NodeId, SceneError> {
        let template = self
            .templates
            .get(node_type)
            .ok_or_else(|| SceneError::UnknownNodeType(node_type.to_string()))?;
        let attributes = template
            .attributes
            .iter()
            .map(|spec| {
                (
                    spec.name.clone(),
                    MemoryAttribute {
                        attr_type: spec.attr_type.clone(),
                        value: spec.default.clone(),
                        min: spec.min,
                    },
                )
            })
            .collect();

        let id = self.next_name(node_type);
        self.nodes.insert(
            id.clone(),
            MemoryNode {
                node_type: node_type.to_string(),
                attributes,
            },
        );
        Ok(id)
    }

    fn set_attribute(
        &mut self,
        node: &NodeId,
        socket: &str,
        value: &AttrValue,
        explicit_type: Option<&AttrType>,
    ) -> Result<(), SceneError> {
        let plug = node.plug(socket);
        let stored = checked_value(&plug, self.attribute(node, socket)?, value, explicit_type)?;
        if let Some(attribute) = self
            .nodes
            .get_mut(node)
            .and_then(|n| n.attributes.get_mut(socket))
        {
            attribute.value = stored;
        }
        Ok(())
    }

    fn connect(&mut self, from: &Plug, to: &Plug) -> Result<(), SceneError> {
        self.attribute(&from.node, &from.socket)?;
        self.attribute(&to.node, &to.socket)?;
        if self.connections.iter().any(|c| &c.to == to) {
            return Err(SceneError::AlreadyConnected(to.clone()));
        }
        self.connections.push(Connection::new(from.clone(), to.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_template() -> NodeTemplate {
        NodeTemplate::new()
            .with(AttrSpec::new("diffuseGain", AttrType::Float, AttrValue::Float(1.0)))
            .with(AttrSpec::new(
                "diffuseColor",
                AttrType::Float3,
                AttrValue::Vector3([0.18, 0.18, 0.18]),
            ))
            .with(AttrSpec::new("presence", AttrType::Float, AttrValue::Float(1.0)).with_min(0.0))
            .with(AttrSpec::new(
                "utilityPattern",
                AttrType::String,
                AttrValue::String(String::new()),
            ))
    }

    fn scene() -> (MemoryScene, NodeId) {
        let mut scene = MemoryScene::new();
        scene.add_template("PxrSurface", surface_template());
        let id = scene.create_node("PxrSurface").unwrap();
        (scene, id)
    }

    #[test]
    fn test_create_node_names() {
        let (mut scene, first) = scene();
        assert_eq!(first, NodeId::new("PxrSurface1"));
        let second = scene.create_node("PxrSurface").unwrap();
        assert_eq!(second, NodeId::new("PxrSurface2"));
        assert_eq!(
            scene.create_node("PxrTexture"),
            Err(SceneError::UnknownNodeType("PxrTexture".to_string()))
        );
    }

    #[test]
    fn test_scalar_writes_convert() {
        let (mut scene, id) = scene();
        scene
            .set_attribute(&id, "diffuseGain", &AttrValue::Int(2), None)
            .unwrap();
        assert_eq!(scene.value(&id, "diffuseGain"), Some(&AttrValue::Float(2.0)));
    }

    #[test]
    fn test_vector_rejects_scalar() {
        let (mut scene, id) = scene();
        let err = scene
            .set_attribute(&id, "diffuseColor", &AttrValue::Float(0.5), None)
            .unwrap_err();
        assert!(err.is_rejection());

        scene
            .set_attribute(
                &id,
                "diffuseColor",
                &AttrValue::Vector3([0.5, 0.5, 0.5]),
                Some(&AttrType::Double3),
            )
            .unwrap();
        assert_eq!(
            scene.attribute_value(&id, "diffuseColor").unwrap(),
            AttrValue::List(vec![AttrValue::Vector3([0.5, 0.5, 0.5])])
        );
    }

    #[test]
    fn test_string_requires_explicit_type() {
        let (mut scene, id) = scene();
        let value = AttrValue::String("mask".to_string());
        assert!(scene.set_attribute(&id, "utilityPattern", &value, None).is_err());
        scene
            .set_attribute(&id, "utilityPattern", &value, Some(&AttrType::String))
            .unwrap();
        assert_eq!(scene.value(&id, "utilityPattern"), Some(&value));
    }

    #[test]
    fn test_minimum_enforced() {
        let (mut scene, id) = scene();
        let err = scene
            .set_attribute(&id, "presence", &AttrValue::Float(-0.5), None)
            .unwrap_err();
        assert!(matches!(err, SceneError::OutOfRange { .. }));
    }

    #[test]
    fn test_connect_rejects_second_input() {
        let (mut scene, surface) = scene();
        let a = scene.add_node("a", "file");
        let b = scene.add_node("b", "file");
        scene
            .add_attribute(&a, "outAlpha", AttrType::Float, AttrValue::Float(1.0))
            .unwrap();
        scene
            .add_attribute(&b, "outAlpha", AttrType::Float, AttrValue::Float(1.0))
            .unwrap();

        scene
            .connect(&a.plug("outAlpha"), &surface.plug("presence"))
            .unwrap();
        assert_eq!(
            scene.connect(&b.plug("outAlpha"), &surface.plug("presence")),
            Err(SceneError::AlreadyConnected(surface.plug("presence")))
        );
        assert!(scene
            .connect(&a.plug("missing"), &surface.plug("diffuseGain"))
            .is_err());

        let incoming = scene.connections(&surface, Direction::Incoming).unwrap();
        assert_eq!(incoming, vec![Edge::new("presence", a.plug("outAlpha"))]);
        assert_eq!(
            scene.connections(&a, Direction::Outgoing).unwrap(),
            vec![Edge::new("outAlpha", surface.plug("presence"))]
        );
        assert_eq!(
            scene.all_connections(),
            [Connection::new(a.plug("outAlpha"), surface.plug("presence"))]
        );
    }

    #[test]
    fn test_ron_round_trip() {
        let (scene, _) = scene();
        let ron = scene.to_ron().unwrap();
        let loaded = MemoryScene::from_ron(&ron).unwrap();
        assert_eq!(loaded, scene);
    }
}

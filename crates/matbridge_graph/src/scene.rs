// SPDX-License-Identifier: MIT OR Apache-2.0
//! Contract between the translation engine and a host scene.

use crate::edge::{Direction, Edge};
use crate::node::NodeId;
use crate::plug::Plug;
use crate::value::{AttrType, AttrValue};

/// Minimal host scene interface.
///
/// The engine never touches a host scene except through this trait. All
/// calls are synchronous; a binding that wraps a live application must be
/// driven from the thread that owns the scene.
pub trait SceneAdapter {
    /// Currently selected nodes with their native types
    fn selection(&self) -> Result<Vec<(NodeId, String)>, SceneError>;

    /// Native type of a node
    fn node_type(&self, node: &NodeId) -> Result<String, SceneError>;

    /// Plug-level connections of a node in one direction
    fn connections(&self, node: &NodeId, direction: Direction) -> Result<Vec<Edge>, SceneError>;

    /// Current value of an attribute
    fn attribute_value(&self, node: &NodeId, socket: &str) -> Result<AttrValue, SceneError>;

    /// Storage type tag of an attribute
    fn attribute_type(&self, node: &NodeId, socket: &str) -> Result<AttrType, SceneError>;

    /// Instantiate a node of the given native type
    fn create_node(&mut self, node_type: &str) -> Result<NodeId, SceneError>;

    /// Assign an attribute, optionally declaring the value's type.
    ///
    /// A host rejects values whose shape does not match the attribute
    /// with [`SceneError::TypeMismatch`].
    fn set_attribute(
        &mut self,
        node: &NodeId,
        socket: &str,
        value: &AttrValue,
        explicit_type: Option<&AttrType>,
    ) -> Result<(), SceneError>;

    /// Connect `from` (upstream) to `to` (downstream)
    fn connect(&mut self, from: &Plug, to: &Plug) -> Result<(), SceneError>;
}

/// Error reported by a scene adapter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Attribute not found on a node
    #[error("Attribute not found: {0}")]
    AttributeNotFound(Plug),

    /// Value shape does not match the attribute
    #[error("Type mismatch on {plug}: expected {expected}, got {value}")]
    TypeMismatch {
        /// Target plug
        plug: Plug,
        /// Attribute storage type
        expected: AttrType,
        /// Rejected value
        value: AttrValue,
    },

    /// Value outside the attribute's allowed range
    #[error("Value {value} out of range for {plug} (min {min})")]
    OutOfRange {
        /// Target plug
        plug: Plug,
        /// Rejected value
        value: f64,
        /// Minimum accepted value
        min: f64,
    },

    /// Host cannot instantiate this node type
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Destination plug already has an incoming connection
    #[error("Already connected: {0}")]
    AlreadyConnected(Plug),

    /// Host-specific failure
    #[error("{0}")]
    Host(String),
}

impl SceneError {
    /// Whether a write was rejected because of the value rather than the target
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::OutOfRange { .. })
    }
}

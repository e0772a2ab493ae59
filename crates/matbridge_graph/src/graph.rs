// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collection of discovered nodes owned by one conversion run.

use crate::edge::{Connection, Direction};
use crate::node::{Node, NodeId};
use crate::plug::Plug;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Part of the network the scene could not report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlGap {
    /// Node whose connections were being read
    pub node: NodeId,
    /// Side being read
    pub direction: Direction,
    /// Far end of the edge, when only the remote node was unreadable
    pub remote: Option<Plug>,
    /// Host error message
    pub detail: String,
}

/// Discovered nodes in first-discovery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSet {
    nodes: IndexMap<NodeId, Node>,
    #[serde(default)]
    gaps: Vec<CrawlGap>,
}

impl NodeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node record. An existing record with the same name is kept.
    pub fn insert(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.name) {
            return false;
        }
        self.nodes.insert(node.name.clone(), node);
        true
    }

    /// Get a node by ID
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Check if a node was discovered
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was discovered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Seed nodes
    pub fn seeds(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.selected)
    }

    /// Nodes that received a destination counterpart
    pub fn converted(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_converted())
    }

    /// Record the destination node created for `id`
    pub fn set_converted(&mut self, id: &NodeId, converted: NodeId) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.converted = Some(converted);
                true
            }
            None => false,
        }
    }

    /// Record a part of the network that could not be read
    pub fn push_gap(&mut self, gap: CrawlGap) {
        self.gaps.push(gap);
    }

    /// Parts of the network that could not be read, in crawl order
    pub fn gaps(&self) -> &[CrawlGap] {
        &self.gaps
    }

    /// Every recorded edge, deduplicated across both endpoints
    pub fn connections(&self) -> IndexSet<Connection> {
        self.nodes.values().flat_map(Node::connections).collect()
    }

    /// Edges whose endpoints were both discovered
    pub fn internal_connections(&self) -> IndexSet<Connection> {
        self.connections()
            .into_iter()
            .filter(|c| self.contains(&c.from.node) && self.contains(&c.to.node))
            .collect()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = indexmap::map::Values<'a, NodeId, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::plug::Plug;

    fn linked_pair() -> NodeSet {
        let mut set = NodeSet::new();
        let mut file = Node::seed(NodeId::new("file1"), "file");
        file.outgoing
            .push(Edge::new("outColor", Plug::new("surface1", "baseColor")));
        let mut surface = Node::new(NodeId::new("surface1"), "aiStandardSurface");
        surface
            .incoming
            .push(Edge::new("baseColor", Plug::new("file1", "outColor")));
        surface
            .outgoing
            .push(Edge::new("outColor", Plug::new("sg1", "surfaceShader")));
        set.insert(file);
        set.insert(surface);
        set
    }

    #[test]
    fn test_insert_keeps_first() {
        let mut set = NodeSet::new();
        assert!(set.insert(Node::seed(NodeId::new("a"), "file")));
        assert!(!set.insert(Node::new(NodeId::new("a"), "other")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&NodeId::new("a")).unwrap().node_type, "file");
    }

    #[test]
    fn test_connections_deduplicated() {
        let set = linked_pair();
        assert_eq!(set.connections().len(), 2);
        assert_eq!(set.internal_connections().len(), 1);
    }

    #[test]
    fn test_set_converted() {
        let mut set = linked_pair();
        assert!(set.set_converted(&NodeId::new("file1"), NodeId::new("PxrTexture1")));
        assert!(!set.set_converted(&NodeId::new("missing"), NodeId::new("x")));
        assert_eq!(set.converted().count(), 1);
        assert_eq!(set.seeds().count(), 1);
    }
}

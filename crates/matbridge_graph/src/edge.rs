// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket-level edges between scene nodes.

use crate::node::NodeId;
use crate::plug::Plug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a node a connection is queried from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Connections feeding the node (upstream)
    Incoming,
    /// Connections the node feeds (downstream)
    Outgoing,
}

impl Direction {
    /// Both directions, upstream first
    pub const BOTH: [Direction; 2] = [Direction::Incoming, Direction::Outgoing];

    /// The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            Self::Incoming => Self::Outgoing,
            Self::Outgoing => Self::Incoming,
        }
    }
}

/// An edge as seen from one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Socket on the node that owns the edge record
    pub local: String,
    /// Plug on the other end
    pub remote: Plug,
}

impl Edge {
    /// Create an edge record
    pub fn new(local: impl Into<String>, remote: Plug) -> Self {
        Self {
            local: local.into(),
            remote,
        }
    }
}

/// A directed connection independent of which endpoint reported it.
///
/// The same scene connection appears once in the source node's outgoing
/// list and once in the target node's incoming list; both map to one
/// `Connection`, which makes it usable as a deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Connection {
    /// Upstream plug
    pub from: Plug,
    /// Downstream plug
    pub to: Plug,
}

impl Connection {
    /// Create a connection
    pub fn new(from: Plug, to: Plug) -> Self {
        Self { from, to }
    }

    /// Canonicalize an edge recorded on `node`
    pub fn from_edge(node: &NodeId, edge: &Edge, direction: Direction) -> Self {
        let local = node.plug(edge.local.clone());
        match direction {
            Direction::Incoming => Self::new(edge.remote.clone(), local),
            Direction::Outgoing => Self::new(local, edge.remote.clone()),
        }
    }

    /// Check if this connection touches a node
    pub fn involves_node(&self, node: &NodeId) -> bool {
        &self.from.node == node || &self.to.node == node
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_views_canonicalize_equal() {
        let a = NodeId::new("file1");
        let b = NodeId::new("aiStandardSurface1");

        let outgoing = Edge::new("outColor", b.plug("baseColor"));
        let incoming = Edge::new("baseColor", a.plug("outColor"));

        assert_eq!(
            Connection::from_edge(&a, &outgoing, Direction::Outgoing),
            Connection::from_edge(&b, &incoming, Direction::Incoming),
        );
    }

    #[test]
    fn test_involves_node() {
        let c = Connection::new(Plug::new("a", "out"), Plug::new("b", "in"));
        assert!(c.involves_node(&NodeId::new("a")));
        assert!(!c.involves_node(&NodeId::new("z")));
        assert_eq!(c.to_string(), "a.out -> b.in");
    }
}

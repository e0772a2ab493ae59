// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node records produced by graph discovery.

use crate::edge::{Connection, Direction, Edge};
use crate::plug::Plug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a scene node (the host's node name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node ID from a host name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The host name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Plug on one of this node's sockets
    pub fn plug(&self, socket: impl Into<String>) -> Plug {
        Plug::new(self.clone(), socket)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One scene node discovered during a crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Host identifier
    pub name: NodeId,
    /// Native node type in the source schema
    pub node_type: String,
    /// Whether the node was one of the seeds
    pub selected: bool,
    /// Connections arriving at this node, as (own socket, remote plug)
    pub incoming: Vec<Edge>,
    /// Connections leaving this node, as (own socket, remote plug)
    pub outgoing: Vec<Edge>,
    /// Node created for this one in the destination schema
    pub converted: Option<NodeId>,
}

impl Node {
    /// Create a record for a node reached through an edge
    pub fn new(name: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            name,
            node_type: node_type.into(),
            selected: false,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            converted: None,
        }
    }

    /// Create a record for a seed node
    pub fn seed(name: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            selected: true,
            ..Self::new(name, node_type)
        }
    }

    /// Mutable edge list for one direction
    pub fn edges_mut(&mut self, direction: Direction) -> &mut Vec<Edge> {
        match direction {
            Direction::Incoming => &mut self.incoming,
            Direction::Outgoing => &mut self.outgoing,
        }
    }

    /// Whether a destination node has been created for this one
    pub fn is_converted(&self) -> bool {
        self.converted.is_some()
    }

    /// Incoming edges as canonical connections ending at this node
    pub fn incoming_connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.incoming
            .iter()
            .map(|edge| Connection::from_edge(&self.name, edge, Direction::Incoming))
    }

    /// All recorded edges as canonical connections
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.incoming_connections().chain(
            self.outgoing
                .iter()
                .map(|edge| Connection::from_edge(&self.name, edge, Direction::Outgoing)),
        )
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.node_type)?;
        if self.selected {
            f.write_str(" [seed]")?;
        }
        if let Some(converted) = &self.converted {
            write!(f, " -> {converted}")?;
        }
        Ok(())
    }
}

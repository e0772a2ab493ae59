// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute-qualified connection endpoints.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A node socket, written `node.socket` by hosts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Plug {
    /// Owning node
    pub node: NodeId,
    /// Attribute path on the node
    pub socket: String,
}

impl Plug {
    /// Create a plug
    pub fn new(node: impl Into<NodeId>, socket: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            socket: socket.into(),
        }
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.socket)
    }
}

/// Error parsing a plug string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid plug: {0:?}")]
pub struct PlugParseError(pub String);

impl FromStr for Plug {
    type Err = PlugParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Node names never contain '.', compound sockets may
        match s.split_once('.') {
            Some((node, socket)) if !node.is_empty() && !socket.is_empty() => {
                Ok(Self::new(node, socket))
            }
            _ => Err(PlugParseError(s.to_string())),
        }
    }
}

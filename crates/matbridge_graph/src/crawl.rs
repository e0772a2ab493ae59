// SPDX-License-Identifier: MIT OR Apache-2.0
//! Discovery of the shading network around a set of seed nodes.
//!
//! The crawl walks upstream from every seed through incoming connections
//! and downstream through outgoing connections, never changing direction
//! on the way. Nodes whose type is on the stop-list mark the edge of the
//! shading network: edges to them are dropped and nothing beyond them is
//! visited.

use crate::edge::{Direction, Edge};
use crate::graph::{CrawlGap, NodeSet};
use crate::node::{Node, NodeId};
use crate::scene::{SceneAdapter, SceneError};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet, VecDeque};

/// Infrastructure node types that bound a shading network
pub const DEFAULT_STOP_LIST: &[&str] = &[
    "colorManagementGlobals",
    "place2dTexture",
    "lightLinker",
    "materialInfo",
    "nodeGraphEditorInfo",
    "partition",
    "defaultShaderList",
];

/// Boundary-respecting graph crawler
#[derive(Debug, Clone)]
pub struct Crawler {
    stop_list: IndexSet<String>,
}

impl Crawler {
    /// Create a crawler with the default stop-list
    pub fn new() -> Self {
        Self::with_stop_list(DEFAULT_STOP_LIST.iter().copied())
    }

    /// Create a crawler with a custom stop-list
    pub fn with_stop_list<I, S>(stop_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stop_list: stop_list.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a node type bounds the network
    pub fn is_boundary(&self, node_type: &str) -> bool {
        self.stop_list.contains(node_type)
    }

    /// Discover every node reachable from `seeds`.
    ///
    /// Each node's connections are queried at most once per direction, so
    /// cyclic networks terminate. Seeds are recorded even when their own
    /// type is stop-listed, but nothing is discovered through them.
    ///
    /// Only an unreadable seed fails the crawl. Connections or remote nodes
    /// the scene cannot report are recorded as [`CrawlGap`]s and the walk
    /// continues without them.
    pub fn crawl<S>(&self, scene: &S, seeds: &[NodeId]) -> Result<NodeSet, SceneError>
    where
        S: SceneAdapter + ?Sized,
    {
        let mut walk = Walk {
            crawler: self,
            scene,
            nodes: NodeSet::new(),
            types: HashMap::new(),
            fetched: HashMap::new(),
            visited: HashSet::new(),
            queue: VecDeque::new(),
        };

        for seed in seeds {
            let node_type = walk.node_type(seed)?;
            if !walk.nodes.insert(Node::seed(seed.clone(), node_type.clone())) {
                continue;
            }
            if self.is_boundary(&node_type) {
                tracing::debug!("Seed {} is a {} boundary node, not expanding", seed, node_type);
                continue;
            }
            for direction in Direction::BOTH {
                walk.queue.push_back((seed.clone(), direction));
            }
        }

        while let Some((id, direction)) = walk.queue.pop_front() {
            walk.visit(id, direction);
        }

        tracing::info!(
            "Crawled {} nodes from {} seeds ({} connections)",
            walk.nodes.len(),
            seeds.len(),
            walk.nodes.connections().len()
        );
        Ok(walk.nodes)
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one crawl
struct Walk<'a, S: ?Sized> {
    crawler: &'a Crawler,
    scene: &'a S,
    nodes: NodeSet,
    types: HashMap<NodeId, String>,
    fetched: HashMap<(NodeId, Direction), Vec<Edge>>,
    visited: HashSet<(NodeId, Direction)>,
    queue: VecDeque<(NodeId, Direction)>,
}

impl<S: SceneAdapter + ?Sized> Walk<'_, S> {
    fn node_type(&mut self, id: &NodeId) -> Result<String, SceneError> {
        if let Some(node_type) = self.types.get(id) {
            return Ok(node_type.clone());
        }
        let node_type = self.scene.node_type(id)?;
        self.types.insert(id.clone(), node_type.clone());
        Ok(node_type)
    }

    /// Query and store the edges of `id` in one direction, without boundary
    /// nodes. The scene is asked at most once per node and direction.
    fn record(&mut self, id: &NodeId, direction: Direction) -> Vec<Edge> {
        let key = (id.clone(), direction);
        if let Some(edges) = self.fetched.get(&key) {
            return edges.clone();
        }

        let found = match self.scene.connections(id, direction) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Cannot read {:?} connections of {}: {}", direction, id, e);
                self.nodes.push_gap(CrawlGap {
                    node: id.clone(),
                    direction,
                    remote: None,
                    detail: e.to_string(),
                });
                Vec::new()
            }
        };

        let mut edges = Vec::new();
        for edge in found {
            let remote_type = match self.node_type(&edge.remote.node) {
                Ok(remote_type) => remote_type,
                Err(e) => {
                    tracing::warn!("Dropping edge from {} to {}: {}", id, edge.remote, e);
                    self.nodes.push_gap(CrawlGap {
                        node: id.clone(),
                        direction,
                        remote: Some(edge.remote),
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            if self.crawler.is_boundary(&remote_type) {
                tracing::trace!("Stopping at {} ({})", edge.remote, remote_type);
                continue;
            }
            edges.push(edge);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            *node.edges_mut(direction) = edges.clone();
        }
        self.fetched.insert(key, edges.clone());
        edges
    }

    fn visit(&mut self, id: NodeId, direction: Direction) {
        if !self.visited.insert((id.clone(), direction)) {
            return;
        }

        for edge in self.record(&id, direction) {
            let remote = edge.remote.node;
            if !self.nodes.contains(&remote) {
                // Recorded edges only lead to nodes whose type was read
                let Some(remote_type) = self.types.get(&remote).cloned() else {
                    continue;
                };
                self.nodes.insert(Node::new(remote.clone(), remote_type));
            }
            if !self.visited.contains(&(remote.clone(), direction)) {
                self.queue.push_back((remote, direction));
            }
        }

        // Every discovered node carries both edge lists, but the walk only
        // continues in the direction it arrived from.
        self.record(&id, direction.reversed());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Re-creation of edges between translated nodes.

use crate::intersection::IntersectionCache;
use crate::report::{EdgeRecord, EdgeSkip, EdgeSkipReason};
use indexmap::IndexSet;
use matbridge_graph::{Connection, NodeSet, SceneAdapter};

/// Edges rebuilt and skipped by one reconnection pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconnectOutcome {
    /// Connections made in the scene
    pub connected: Vec<EdgeRecord>,
    /// Connections left out
    pub skipped: Vec<EdgeSkip>,
}

/// Re-points the crawled edges onto the destination nodes
#[derive(Debug, Clone, Copy)]
pub struct ConnectionRebuilder<'c, 'a> {
    intersections: &'c IntersectionCache<'a>,
}

impl<'c, 'a> ConnectionRebuilder<'c, 'a> {
    /// Create a rebuilder resolving sockets through `intersections`
    pub fn new(intersections: &'c IntersectionCache<'a>) -> Self {
        Self { intersections }
    }

    /// Rebuild every incoming edge of every translated node.
    ///
    /// The downstream socket fans out to each of its destination attributes;
    /// the upstream socket uses its first. A scene connection is handled once
    /// even when both endpoints recorded it.
    pub fn reconnect<S>(&self, scene: &mut S, nodes: &NodeSet) -> ReconnectOutcome
    where
        S: SceneAdapter + ?Sized,
    {
        let mut outcome = ReconnectOutcome::default();
        let mut seen: IndexSet<Connection> = IndexSet::new();

        for node in nodes.converted() {
            let Some(local_new) = node.converted.as_ref() else {
                continue;
            };
            for edge in node.incoming_connections() {
                if !seen.insert(edge.clone()) {
                    continue;
                }

                let skip = |reason: EdgeSkipReason| EdgeSkip {
                    edge: edge.clone(),
                    reason,
                    detail: None,
                };

                let Some(remote) = nodes.get(&edge.from.node) else {
                    tracing::debug!("Skipping {}: upstream node was not crawled", edge);
                    outcome.skipped.push(skip(EdgeSkipReason::RemoteNotFound));
                    continue;
                };
                let Some(remote_new) = remote.converted.as_ref() else {
                    tracing::debug!("Skipping {}: {} was not translated", edge, remote.name);
                    outcome.skipped.push(skip(EdgeSkipReason::RemoteNotTranslated));
                    continue;
                };

                let local = self.intersections.get_or_compute(&node.node_type);
                let local_sockets = local
                    .as_deref()
                    .map(|i| i.destinations(&edge.to.socket))
                    .unwrap_or(&[]);
                if local_sockets.is_empty() {
                    tracing::warn!("Skipping {}: no destination input for {}", edge, edge.to);
                    outcome.skipped.push(skip(EdgeSkipReason::NoLocalEquivalent));
                    continue;
                }
                let remote_intersection = self.intersections.get_or_compute(&remote.node_type);
                let Some(remote_socket) = remote_intersection
                    .as_deref()
                    .and_then(|i| i.first_destination(&edge.from.socket))
                else {
                    tracing::warn!("Skipping {}: no destination output for {}", edge, edge.from);
                    outcome.skipped.push(skip(EdgeSkipReason::NoRemoteEquivalent));
                    continue;
                };

                for local_socket in local_sockets {
                    let rebuilt =
                        Connection::new(remote_new.plug(remote_socket), local_new.plug(local_socket.clone()));
                    match scene.connect(&rebuilt.from, &rebuilt.to) {
                        Ok(()) => {
                            tracing::debug!("Rebuilt {} as {}", edge, rebuilt);
                            outcome.connected.push(EdgeRecord {
                                source: edge.clone(),
                                rebuilt,
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Failed to connect {}: {}", rebuilt, e);
                            outcome.skipped.push(EdgeSkip {
                                detail: Some(e.to_string()),
                                ..skip(EdgeSkipReason::ConnectFailed)
                            });
                        }
                    }
                }
            }
        }

        tracing::info!(
            "Rebuilt {} connections, skipped {}",
            outcome.connected.len(),
            outcome.skipped.len()
        );
        outcome
    }
}

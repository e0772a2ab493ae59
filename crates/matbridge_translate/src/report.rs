// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outcome of a conversion run.
//!
//! Nothing short of a missing schema or an unreadable network aborts a run.
//! Everything that was skipped is listed here with the reason, so callers
//! can tell a complete conversion from a partial one.

use crate::error::TranslateError;
use indexmap::IndexMap;
use matbridge_graph::{Connection, CrawlGap, NodeId, Plug};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a node was not converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeFailureReason {
    /// Source type has no schema entry
    SchemaMissing,
    /// Common type has no destination entry
    DestinationMissing,
    /// Scene refused to create the node
    Scene,
}

/// A node that produced no destination node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFailure {
    /// Source node
    pub node: NodeId,
    /// Native source type
    pub node_type: String,
    /// Failure kind
    pub reason: NodeFailureReason,
    /// Error message
    pub detail: String,
}

impl NodeFailure {
    /// Record a translation error
    pub fn new(node: NodeId, node_type: impl Into<String>, error: &TranslateError) -> Self {
        let reason = match error {
            TranslateError::SchemaMissing { .. } => NodeFailureReason::SchemaMissing,
            TranslateError::DestinationMissing { .. } => NodeFailureReason::DestinationMissing,
            TranslateError::Scene(_) => NodeFailureReason::Scene,
        };
        Self {
            node,
            node_type: node_type.into(),
            reason,
            detail: error.to_string(),
        }
    }
}

/// Why an attribute was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSkipReason {
    /// No destination attribute for the source attribute
    Unmapped,
    /// Source value or type could not be read
    ReadFailed,
    /// A transform could not handle the value
    TransformFailed,
    /// Direct write and fallback were both rejected
    CoercionExhausted,
    /// The write failed for a reason other than the value
    WriteFailed,
}

impl fmt::Display for FieldSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unmapped => "unmapped",
            Self::ReadFailed => "read failed",
            Self::TransformFailed => "transform failed",
            Self::CoercionExhausted => "coercion exhausted",
            Self::WriteFailed => "write failed",
        })
    }
}

/// A skipped attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSkip {
    /// Source node
    pub node: NodeId,
    /// Source attribute, or destination socket for write failures
    pub field: String,
    /// Skip kind
    pub reason: FieldSkipReason,
    /// Error message, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FieldSkip {
    /// Create a skip record
    pub fn new(node: &NodeId, field: impl Into<String>, reason: FieldSkipReason) -> Self {
        Self {
            node: node.clone(),
            field: field.into(),
            reason,
            detail: None,
        }
    }

    /// Attach an error message
    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

/// Why an edge was not rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSkipReason {
    /// The upstream node produced no destination node
    RemoteNotTranslated,
    /// The upstream node is not part of the crawled network
    RemoteNotFound,
    /// The downstream socket has no destination equivalent
    NoLocalEquivalent,
    /// The upstream socket has no destination equivalent
    NoRemoteEquivalent,
    /// The scene refused the connection
    ConnectFailed,
}

impl fmt::Display for EdgeSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RemoteNotTranslated => "upstream node not translated",
            Self::RemoteNotFound => "upstream node not crawled",
            Self::NoLocalEquivalent => "no destination input",
            Self::NoRemoteEquivalent => "no destination output",
            Self::ConnectFailed => "connect failed",
        })
    }
}

/// A skipped edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSkip {
    /// Source scene connection
    pub edge: Connection,
    /// Skip kind
    pub reason: EdgeSkipReason,
    /// Error message, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A rebuilt edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source scene connection
    pub source: Connection,
    /// Connection made between the destination nodes
    pub rebuilt: Connection,
}

impl EdgeRecord {
    /// Upstream destination plug
    pub fn from(&self) -> &Plug {
        &self.rebuilt.from
    }

    /// Downstream destination plug
    pub fn to(&self) -> &Plug {
        &self.rebuilt.to
    }
}

/// Everything a conversion run did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Run identifier, also attached to the run's log span
    pub run_id: Uuid,
    /// Source schema name
    pub source_schema: String,
    /// Destination schema name
    pub destination_schema: String,
    /// Number of nodes found by the crawl
    pub discovered: usize,
    /// Connections and nodes the scene could not report during the crawl
    #[serde(default)]
    pub crawl_gaps: Vec<CrawlGap>,
    /// Source node to created destination node, in crawl order
    pub mapping: IndexMap<NodeId, NodeId>,
    /// Nodes that were not converted
    pub failures: Vec<NodeFailure>,
    /// Attributes that were not written
    pub skipped_fields: Vec<FieldSkip>,
    /// Rebuilt edges
    pub connected: Vec<EdgeRecord>,
    /// Edges that were not rebuilt
    pub skipped_edges: Vec<EdgeSkip>,
}

impl ConversionReport {
    /// Create an empty report
    pub fn new(run_id: Uuid, source_schema: &str, destination_schema: &str) -> Self {
        Self {
            run_id,
            source_schema: source_schema.to_string(),
            destination_schema: destination_schema.to_string(),
            discovered: 0,
            crawl_gaps: Vec::new(),
            mapping: IndexMap::new(),
            failures: Vec::new(),
            skipped_fields: Vec::new(),
            connected: Vec::new(),
            skipped_edges: Vec::new(),
        }
    }

    /// Source node to destination node
    pub fn mapping(&self) -> &IndexMap<NodeId, NodeId> {
        &self.mapping
    }

    /// Destination node created for a source node
    pub fn converted(&self, old: &NodeId) -> Option<&NodeId> {
        self.mapping.get(old)
    }

    /// Whether the whole network was read and every discovered node converted
    pub fn is_complete(&self) -> bool {
        self.crawl_gaps.is_empty()
            && self.failures.is_empty()
            && self.mapping.len() == self.discovered
    }

    /// Skipped attributes of one source node
    pub fn skipped_fields_of<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a FieldSkip> {
        self.skipped_fields.iter().filter(move |skip| &skip.node == node)
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} of {} nodes converted, {} failed, {} fields skipped, {} edges rebuilt, {} edges skipped, {} crawl gaps",
            self.mapping.len(),
            self.discovered,
            self.failures.len(),
            self.skipped_fields.len(),
            self.connected.len(),
            self.skipped_edges.len(),
            self.crawl_gaps.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ConversionReport {
        let mut report = ConversionReport::new(Uuid::new_v4(), "arnold", "renderman");
        report.discovered = 2;
        report
            .mapping
            .insert(NodeId::new("aiStandardSurface1"), NodeId::new("PxrSurface1"));
        report.failures.push(NodeFailure::new(
            NodeId::new("ramp1"),
            "ramp",
            &TranslateError::SchemaMissing {
                node: NodeId::new("ramp1"),
                node_type: "ramp".to_string(),
            },
        ));
        report.skipped_fields.push(
            FieldSkip::new(&NodeId::new("aiStandardSurface1"), "caustics", FieldSkipReason::Unmapped),
        );
        report
    }

    #[test]
    fn test_completeness() {
        let report = report();
        assert!(!report.is_complete());
        assert_eq!(
            report.converted(&NodeId::new("aiStandardSurface1")),
            Some(&NodeId::new("PxrSurface1"))
        );
        assert_eq!(report.failures[0].reason, NodeFailureReason::SchemaMissing);
        assert_eq!(
            report
                .skipped_fields_of(&NodeId::new("aiStandardSurface1"))
                .count(),
            1
        );
    }

    #[test]
    fn test_json_output() {
        let report = report();
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"aiStandardSurface1\": \"PxrSurface1\""));
        let back: ConversionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_summary() {
        let summary = report().summary();
        assert!(summary.starts_with("1 of 2 nodes converted, 1 failed"));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-network conversion: crawl, translate every node, reconnect.

use crate::error::ConvertError;
use crate::intersection::IntersectionCache;
use crate::reconnect::ConnectionRebuilder;
use crate::report::{ConversionReport, NodeFailure};
use crate::schema::SchemaRegistry;
use crate::settings::ConvertSettings;
use crate::translate::NodeTranslator;
use matbridge_graph::{Crawler, NodeId, SceneAdapter};
use uuid::Uuid;

/// Converts shading networks between two registered schemas
#[derive(Debug, Clone)]
pub struct GraphConverter<'r> {
    registry: &'r SchemaRegistry,
    source_schema: String,
    destination_schema: String,
    crawler: Crawler,
    reconnect: bool,
}

impl<'r> GraphConverter<'r> {
    /// Create a converter with the default stop-list
    pub fn new(registry: &'r SchemaRegistry, source_schema: &str, destination_schema: &str) -> Self {
        Self {
            registry,
            source_schema: source_schema.to_string(),
            destination_schema: destination_schema.to_string(),
            crawler: Crawler::new(),
            reconnect: true,
        }
    }

    /// Create a converter from settings
    pub fn from_settings(registry: &'r SchemaRegistry, settings: &ConvertSettings) -> Self {
        Self {
            crawler: Crawler::with_stop_list(settings.stop_list.iter().cloned()),
            reconnect: settings.reconnect,
            ..Self::new(registry, &settings.source_schema, &settings.destination_schema)
        }
    }

    /// Replace the crawl boundary
    pub fn with_crawler(mut self, crawler: Crawler) -> Self {
        self.crawler = crawler;
        self
    }

    /// Enable or disable the reconnection pass
    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Convert the network around `seeds`.
    ///
    /// Fails only if either schema is unknown or a seed cannot be read.
    /// Unreadable parts of the network and per-node, per-field and per-edge
    /// problems are listed in the returned report.
    pub fn convert<S>(&self, scene: &mut S, seeds: &[NodeId]) -> Result<ConversionReport, ConvertError>
    where
        S: SceneAdapter + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "convert_graph",
            run = %run_id,
            from = %self.source_schema,
            to = %self.destination_schema
        );
        let _enter = span.enter();

        let pair = self
            .registry
            .pair(&self.source_schema, &self.destination_schema)?;
        let mut report =
            ConversionReport::new(run_id, &self.source_schema, &self.destination_schema);

        let mut nodes = self
            .crawler
            .crawl(&*scene, seeds)
            .map_err(ConvertError::Crawl)?;
        report.discovered = nodes.len();
        report.crawl_gaps = nodes.gaps().to_vec();

        let mut intersections = IntersectionCache::new(pair);
        intersections.prepare(nodes.iter().map(|node| node.node_type.as_str()));

        let translator = NodeTranslator::new(pair);
        let ids: Vec<NodeId> = nodes.ids().cloned().collect();
        for id in &ids {
            let Some(node) = nodes.get(id) else {
                continue;
            };
            match translator.translate(scene, node, &intersections) {
                Ok(translated) => {
                    report.skipped_fields.extend(translated.skipped);
                    report
                        .mapping
                        .insert(id.clone(), translated.destination.clone());
                    nodes.set_converted(id, translated.destination);
                }
                Err(e) => {
                    tracing::warn!("Not converting {}: {}", id, e);
                    report
                        .failures
                        .push(NodeFailure::new(id.clone(), node.node_type.clone(), &e));
                }
            }
        }
        tracing::info!(
            "Translated {} of {} nodes",
            report.mapping.len(),
            report.discovered
        );

        if self.reconnect {
            let outcome = ConnectionRebuilder::new(&intersections).reconnect(scene, &nodes);
            report.connected = outcome.connected;
            report.skipped_edges = outcome.skipped;
        }

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    /// Convert the network around the scene's current selection
    pub fn convert_selection<S>(&self, scene: &mut S) -> Result<ConversionReport, ConvertError>
    where
        S: SceneAdapter + ?Sized,
    {
        let seeds: Vec<NodeId> = scene
            .selection()
            .map_err(ConvertError::Selection)?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        self.convert(scene, &seeds)
    }
}

/// Convert the network around `seeds` from one schema to another
pub fn convert_graph<S>(
    scene: &mut S,
    registry: &SchemaRegistry,
    seeds: &[NodeId],
    source_schema: &str,
    destination_schema: &str,
) -> Result<ConversionReport, ConvertError>
where
    S: SceneAdapter + ?Sized,
{
    GraphConverter::new(registry, source_schema, destination_schema).convert(scene, seeds)
}

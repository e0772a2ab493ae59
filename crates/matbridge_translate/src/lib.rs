// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema translation engine for `MatBridge`.
//!
//! Translates a discovered shading network from one renderer's attribute
//! schema into another's:
//! - Source tables map native attributes onto a renderer-neutral "common"
//!   layer, with fan-out and value transforms
//! - Destination tables map common attributes onto the target renderer
//! - The translator rebuilds each node through that common layer and
//!   coerces values the destination rejects
//! - The rebuilder re-points every edge between translated nodes
//!
//! ## Architecture
//!
//! A [`SchemaRegistry`] is built once and only read afterwards. A
//! conversion run ([`GraphConverter::convert`]) crawls the network, translates
//! every node, then reconnects, and returns a [`ConversionReport`] listing
//! what was created and what was skipped.

pub mod transform;
pub mod schema;
pub mod builtin;
pub mod intersection;
pub mod record;
pub mod translate;
pub mod reconnect;
pub mod convert;
pub mod report;
pub mod settings;
pub mod error;

pub use transform::{Transform, TransformFn};
pub use schema::{
    DestinationNodeSchema, DestinationSchema, FieldRule, MappingEntry, SchemaPair,
    SchemaFile, SchemaRegistry, SourceNodeSchema, SourceSchema,
};
pub use intersection::{Intersection, IntersectionCache};
pub use record::{plan_assignments, Assignment, AttributeValueRecord, Coercion, CommonRecord};
pub use translate::{NodeTranslator, TranslatedNode};
pub use reconnect::{ConnectionRebuilder, ReconnectOutcome};
pub use convert::{convert_graph, GraphConverter};
pub use report::{
    ConversionReport, EdgeRecord, EdgeSkip, EdgeSkipReason, FieldSkip, FieldSkipReason,
    NodeFailure, NodeFailureReason,
};
pub use settings::{ConvertSettings, SETTINGS_FORMAT_VERSION};
pub use builtin::{ARNOLD, RENDERMAN};
pub use error::{ConvertError, SchemaError, SettingsError, TranslateError};
